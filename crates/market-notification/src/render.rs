//! 시세 스냅샷 요약 렌더러.
//!
//! 스냅샷 하나를 외환, 금, 나스닥 100 세 개의 임베드로 변환합니다.
//! 스냅샷에 없는 심볼은 건너뛰고, 한 번도 갱신되지 않은 스냅샷은 렌더링하지 않습니다.
//! 단건 조회 명령어(`gold`, `forex`, `nas100`)의 응답 임베드도 여기서 만듭니다.

use market_core::{ForexPair, Quote, Snapshot};

use crate::types::Embed;

const FOREX_COLOR: u32 = 0x3498db;
const GOLD_COLOR: u32 = 0xffd700;
const NASDAQ_COLOR: u32 = 0x9b59b6;

const FOREX_PAIRS: [(&str, &str); 7] = [
    ("EURUSD", "EUR/USD"),
    ("GBPUSD", "GBP/USD"),
    ("USDJPY", "USD/JPY"),
    ("USDCHF", "USD/CHF"),
    ("AUDUSD", "AUD/USD"),
    ("USDCAD", "USD/CAD"),
    ("NZDUSD", "NZD/USD"),
];

/// (키, 표시 이름, inline)
const GOLD_ASSETS: [(&str, &str, bool); 3] = [
    ("GOLD", "Gold Futures / US Dollar", false),
    ("GLD", "SPDR Gold Trust ETF", true),
    ("IAU", "iShares Gold Trust", true),
];

/// 스냅샷을 게시용 임베드 목록으로 변환합니다.
///
/// 순서는 외환, 금, 나스닥 100이며 나스닥은 시세가 있을 때만 포함됩니다.
/// `last_updated`가 없으면 빈 목록을 반환합니다.
pub fn render_market_summary(snapshot: &Snapshot, interval_minutes: u64) -> Vec<Embed> {
    let Some(updated) = snapshot.last_updated else {
        return Vec::new();
    };
    let timestamp = updated.format("%Y-%m-%d %H:%M:%S UTC").to_string();

    let mut embeds = vec![
        forex_embed(snapshot, &timestamp, interval_minutes),
        gold_embed(snapshot, &timestamp, interval_minutes),
    ];
    if let Some(nasdaq) = nasdaq_embed(snapshot, &timestamp, interval_minutes) {
        embeds.push(nasdaq);
    }
    embeds
}

fn footer(source: &str, interval_minutes: u64) -> String {
    format!(
        "{} data provided by Yahoo Finance • Auto-update every {} minutes",
        source, interval_minutes
    )
}

fn forex_embed(snapshot: &Snapshot, timestamp: &str, interval_minutes: u64) -> Embed {
    let mut embed = Embed::new(
        "💱 Forex Markets Update",
        format!("Current forex rates as of {}", timestamp),
        FOREX_COLOR,
    );

    for (key, name) in FOREX_PAIRS {
        let Some(quote) = snapshot.get(key) else {
            continue;
        };
        // 엔화 호가 통화쌍은 소수점 2자리
        let decimals = if key.ends_with("JPY") { 2 } else { 5 };
        let value = format!(
            "**Current Rate:** {}\n\
             **Change:** {}\n\
             **Day Range:** {} - {}\n\
             **Previous Close:** {}",
            fixed(quote.price, decimals),
            signed_percent(quote),
            fixed(quote.day_range.low, decimals),
            fixed(quote.day_range.high, decimals),
            fixed(quote.previous_close, decimals),
        );
        embed = embed.field(name, value, true);
    }

    embed.footer(footer("Forex", interval_minutes))
}

fn gold_embed(snapshot: &Snapshot, timestamp: &str, interval_minutes: u64) -> Embed {
    let mut embed = Embed::new(
        "💰 Gold Markets Update",
        format!("Current gold prices as of {}", timestamp),
        GOLD_COLOR,
    );

    for (key, name, inline) in GOLD_ASSETS {
        let Some(quote) = snapshot.get(key) else {
            continue;
        };
        let value = format!(
            "**Current Price:** ${}\n\
             **Change:** {}\n\
             **Day Range:** ${} - ${}\n\
             **Volume:** {}\n\
             **Previous Close:** ${}",
            fixed(quote.price, 2),
            signed_percent(quote),
            fixed(quote.day_range.low, 2),
            fixed(quote.day_range.high, 2),
            group_digits(quote.volume),
            fixed(quote.previous_close, 2),
        );
        embed = embed.field(name, value, inline);
    }

    embed.footer(footer("Gold", interval_minutes))
}

fn nasdaq_embed(snapshot: &Snapshot, timestamp: &str, interval_minutes: u64) -> Option<Embed> {
    let quote = snapshot.get("NAS100")?;

    let mut value = format!(
        "**Current Value:** {}\n\
         **Change:** {}\n\
         **Day Range:** {} - {}\n\
         **Volume:** {}\n\
         **Previous Close:** {}",
        fixed(quote.price, 2),
        signed_percent(quote),
        fixed(quote.day_range.low, 2),
        fixed(quote.day_range.high, 2),
        group_digits(quote.volume),
        fixed(quote.previous_close, 2),
    );
    if let Some(year) = quote.year_range {
        value.push_str(&format!(
            "\n**52 Week Range:** {} - {}",
            grouped_fixed(year.low, 2),
            grouped_fixed(year.high, 2)
        ));
    }

    Some(
        Embed::new(
            "📈 NASDAQ-100 Update",
            format!("Current index value as of {}", timestamp),
            NASDAQ_COLOR,
        )
        .field("NASDAQ-100", value, false)
        .footer(footer("NASDAQ-100", interval_minutes)),
    )
}

/// 금 선물 단건 조회 응답.
pub fn render_gold_quote(quote: &Quote) -> Embed {
    Embed::new(
        "💰 Gold Price (COMEX)",
        format!("${} per troy ounce", fixed(quote.price, 2)),
        GOLD_COLOR,
    )
    .field("24h Change", change_arrow(quote), true)
}

/// 통화쌍 단건 조회 응답.
pub fn render_forex_quote(pair: &ForexPair, quote: &Quote) -> Embed {
    Embed::new(
        format!("💱 {} Exchange Rate", pair),
        format!("1 {} = {} {}", pair.base, fixed(quote.price, 4), pair.target),
        FOREX_COLOR,
    )
    .field("24h Change", change_arrow(quote), true)
}

/// 나스닥 100 단건 조회 응답.
pub fn render_nasdaq_quote(quote: &Quote) -> Embed {
    Embed::new(
        "📊 NASDAQ 100 Index",
        format!("${}", grouped_fixed(quote.price, 2)),
        NASDAQ_COLOR,
    )
    .field("24h Change", change_arrow(quote), true)
}

/// 방향 화살표와 변동률 절댓값 (예: "📉 1.23%").
fn change_arrow(quote: &Quote) -> String {
    let arrow = if quote.is_up() { "📈" } else { "📉" };
    format!("{} {:.2}%", arrow, quote.change_percent.abs())
}

fn fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// 변동률 포맷 (예: "+5.00%", "-1.23%").
pub fn signed_percent(quote: &Quote) -> String {
    let sign = if quote.is_up() { "+" } else { "" };
    format!("{}{:.2}%", sign, quote.change_percent)
}

/// 천 단위 구분 기호를 넣습니다 (예: 1234567 → "1,234,567").
pub fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// 천 단위 구분 기호가 있는 고정 소수점 포맷 (예: 16542.2 → "16,542.20").
pub fn grouped_fixed(value: f64, decimals: usize) -> String {
    let formatted = fixed(value.abs(), decimals);
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }
    match int_part.parse::<u64>() {
        Ok(n) => out.push_str(&group_digits(n)),
        Err(_) => out.push_str(int_part),
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}
