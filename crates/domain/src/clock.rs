//! # Clock（時刻プロバイダ）
//!
//! `updatedAt` の更新時刻をハンドラに注入するための抽象化。
//! テストでは [`FixedClock`] を渡して更新時刻を検証する。

use chrono::{DateTime, Utc};

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
   fn now(&self) -> DateTime<Utc>;
}

/// システム時刻
pub struct SystemClock;

impl Clock for SystemClock {
   fn now(&self) -> DateTime<Utc> {
      Utc::now()
   }
}

/// 常に同じ時刻を返す実装
pub struct FixedClock {
   now: DateTime<Utc>,
}

impl FixedClock {
   pub fn new(now: DateTime<Utc>) -> Self {
      Self { now }
   }
}

impl Clock for FixedClock {
   fn now(&self) -> DateTime<Utc> {
      self.now
   }
}

#[cfg(test)]
mod tests {
   use chrono::TimeZone;

   use super::*;

   #[test]
   fn test_system_clockは呼び出し前後の時刻の間を返す() {
      let before = Utc::now();
      let now = SystemClock.now();
      let after = Utc::now();

      assert!(before <= now && now <= after);
   }

   #[test]
   fn test_fixed_clockは渡した時刻を返し続ける() {
      let fixed = Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap();
      let clock = FixedClock::new(fixed);

      assert_eq!(clock.now(), fixed);
      assert_eq!(clock.now(), fixed);
   }
}
