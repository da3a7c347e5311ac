//! 자동 갱신 주기.

use std::num::IntErrorKind;
use std::time::Duration;

use crate::error::ValidationError;

/// 최소 갱신 주기 (분).
pub const MIN_INTERVAL_MINUTES: u64 = 1;
/// 최대 갱신 주기 (분, 24시간).
pub const MAX_INTERVAL_MINUTES: u64 = 1440;
/// 기본 갱신 주기 (분).
pub const DEFAULT_INTERVAL_MINUTES: u64 = 15;

/// 검증된 갱신 주기.
///
/// 항상 60초 이상 24시간 이하입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    minutes: u64,
}

impl Schedule {
    /// 분 단위 값으로 주기를 생성합니다.
    pub fn from_minutes(minutes: i64) -> Result<Self, ValidationError> {
        let min = MIN_INTERVAL_MINUTES as i64;
        let max = MAX_INTERVAL_MINUTES as i64;
        if !(min..=max).contains(&minutes) {
            return Err(ValidationError::OutOfRange {
                value: minutes,
                min,
                max,
            });
        }

        Ok(Self {
            minutes: minutes as u64,
        })
    }

    /// 명령어 인자를 파싱하여 주기를 생성합니다.
    pub fn parse(arg: Option<&str>) -> Result<Self, ValidationError> {
        let raw = arg.map(str::trim).filter(|s| !s.is_empty());
        let Some(raw) = raw else {
            return Err(ValidationError::MissingArgument);
        };

        // i64 범위를 벗어난 정수는 숫자가 아니라 범위 초과로 취급
        let minutes: i64 = match raw.parse() {
            Ok(minutes) => minutes,
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => i64::MAX,
                IntErrorKind::NegOverflow => i64::MIN,
                _ => return Err(ValidationError::NotANumber(raw.to_string())),
            },
        };

        Self::from_minutes(minutes)
    }

    /// 분 단위 주기.
    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    /// 주기를 Duration으로 반환.
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.minutes * 60)
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            minutes: DEFAULT_INTERVAL_MINUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(Schedule::from_minutes(1).unwrap().period(), Duration::from_millis(60_000));
        assert_eq!(
            Schedule::from_minutes(1440).unwrap().period(),
            Duration::from_millis(86_400_000)
        );
        assert!(matches!(
            Schedule::from_minutes(0),
            Err(ValidationError::OutOfRange { value: 0, .. })
        ));
        assert!(matches!(
            Schedule::from_minutes(1441),
            Err(ValidationError::OutOfRange { value: 1441, .. })
        ));
    }

    #[test]
    fn test_parse_argument() {
        assert_eq!(Schedule::parse(Some("30")).unwrap().minutes(), 30);
        assert_eq!(Schedule::parse(Some(" 45 ")).unwrap().minutes(), 45);
        assert_eq!(Schedule::parse(None), Err(ValidationError::MissingArgument));
        assert_eq!(
            Schedule::parse(Some("x")),
            Err(ValidationError::NotANumber("x".to_string()))
        );
        assert!(matches!(
            Schedule::parse(Some("-5")),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_overflowing_argument_is_out_of_range() {
        assert!(matches!(
            Schedule::parse(Some("99999999999999999999")),
            Err(ValidationError::OutOfRange { value: i64::MAX, .. })
        ));
        assert!(matches!(
            Schedule::parse(Some("-99999999999999999999")),
            Err(ValidationError::OutOfRange { value: i64::MIN, .. })
        ));
        assert_eq!(
            Schedule::parse(Some("1.5")),
            Err(ValidationError::NotANumber("1.5".to_string()))
        );
    }

    #[test]
    fn test_default_is_fifteen_minutes() {
        assert_eq!(Schedule::default().minutes(), 15);
    }
}
