//! 时间工具函数: 营业日 / 班次日期
//!
//! 班次日期 (shift date) 以营业日计算：cutoff 之前的时间仍属于前一天的班次，
//! 凌晨收尾的服务请求不会落到新一天的桌台分配上。

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析 cutoff 时间字符串 (HH:MM)，失败返回 00:00
pub fn parse_cutoff(cutoff: &str) -> NaiveTime {
    NaiveTime::parse_from_str(cutoff, "%H:%M").unwrap_or_else(|e| {
        tracing::warn!(
            "Failed to parse business_day_cutoff '{}': {}, falling back to 00:00",
            cutoff,
            e
        );
        NaiveTime::MIN
    })
}

/// 给定时刻所属的营业日
///
/// 本地时间 < cutoff → 还在"昨天"的营业日
pub fn business_date_at(now: DateTime<Utc>, cutoff: NaiveTime, tz: Tz) -> NaiveDate {
    let local = now.with_timezone(&tz);
    if local.time() < cutoff {
        (local - Duration::days(1)).date_naive()
    } else {
        local.date_naive()
    }
}

/// 计算当前营业日 (业务时区)
pub fn current_business_date(cutoff: NaiveTime, tz: Tz) -> NaiveDate {
    business_date_at(Utc::now(), cutoff, tz)
}

/// 距离下一个 cutoff 的时长
///
/// DST gap: 本地时间不存在时按 1 小时后重试计算的结果兜底。
pub fn duration_until_next_cutoff(now: DateTime<Utc>, cutoff: NaiveTime, tz: Tz) -> std::time::Duration {
    let local = now.with_timezone(&tz);
    let today_cutoff = local.date_naive().and_time(cutoff);
    let target_naive = if local.naive_local() < today_cutoff {
        today_cutoff
    } else {
        today_cutoff + Duration::days(1)
    };

    let target = target_naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| now + Duration::hours(1));

    (target - now)
        .to_std()
        .unwrap_or(std::time::Duration::from_secs(60))
}
