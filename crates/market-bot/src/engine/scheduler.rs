//! 교체 가능한 단일 반복 타이머.
//!
//! 상태는 `Idle`과 `Active(schedule)` 두 가지이며 [`Scheduler::start`]만이 주기를 바꿉니다.
//! `start`는 잠금 안에서 이전 타이머를 취소한 뒤 새 타이머를 설치하므로 두 타이머가
//! 동시에 동작하는 구간이 없습니다. 취소된 타이머는 새 tick을 시작하지 않으며
//! 이미 실행 중인 tick은 끝까지 진행됩니다.

use std::sync::Arc;

use market_core::{Schedule, ValidationError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::Engine;

enum SchedulerState {
    Idle,
    Active {
        schedule: Schedule,
        token: CancellationToken,
        handle: JoinHandle<()>,
    },
}

/// 예약 갱신 스케줄러.
pub struct Scheduler {
    engine: Arc<Engine>,
    state: Mutex<SchedulerState>,
}

impl Scheduler {
    /// 대기 상태의 스케줄러를 생성합니다.
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            state: Mutex::new(SchedulerState::Idle),
        }
    }

    /// 기존 타이머를 해제하고 새 주기로 타이머를 설치합니다.
    ///
    /// 첫 tick은 한 주기 뒤에 실행됩니다.
    pub async fn start(&self, schedule: Schedule) {
        let mut state = self.state.lock().await;

        if let SchedulerState::Active { token, schedule: old, .. } = &*state {
            token.cancel();
            info!(old_minutes = old.minutes(), "기존 자동 업데이트 타이머 해제");
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(run_timer(self.engine.clone(), schedule, token.clone()));
        self.engine.set_interval_minutes(schedule.minutes());

        *state = SchedulerState::Active {
            schedule,
            token,
            handle,
        };
        info!(minutes = schedule.minutes(), "자동 업데이트 시작");
    }

    /// 타이머를 설치한 뒤 즉시 한 번 실행합니다.
    ///
    /// 타이머를 먼저 설치하므로 초기 실행 도중 들어온 주기 변경이 그대로 유지됩니다.
    pub async fn launch(&self, schedule: Schedule) {
        self.start(schedule).await;
        self.engine.tick().await;
    }

    /// 명령어 인자를 검증한 뒤 주기를 교체합니다.
    ///
    /// 검증에 실패하면 현재 타이머는 그대로 유지됩니다.
    pub async fn set_interval(&self, arg: Option<&str>) -> Result<Schedule, ValidationError> {
        let schedule = Schedule::parse(arg)?;
        self.start(schedule).await;
        Ok(schedule)
    }

    /// 타이머를 해제하고 대기 상태로 돌아갑니다.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        if let SchedulerState::Active { token, handle, .. } =
            std::mem::replace(&mut *state, SchedulerState::Idle)
        {
            token.cancel();
            if let Err(e) = handle.await {
                error!(error = %e, "스케줄러 태스크 종료 실패");
            }
            info!("자동 업데이트 중지");
        }
    }

    /// 현재 주기. 대기 상태면 `None`.
    pub async fn current(&self) -> Option<Schedule> {
        match &*self.state.lock().await {
            SchedulerState::Idle => None,
            SchedulerState::Active { schedule, .. } => Some(*schedule),
        }
    }
}

async fn run_timer(engine: Arc<Engine>, schedule: Schedule, token: CancellationToken) {
    let period = schedule.period();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            _ = token.cancelled() => break,

            _ = ticker.tick() => {
                // panic이 나도 타이머는 유지
                let engine = engine.clone();
                if let Err(e) = tokio::spawn(async move { engine.tick().await }).await {
                    error!(error = %e, "예약 실행 실패");
                }
            }
        }
    }
}
