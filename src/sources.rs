//! Built-in feed sources and their fallback posts.
//!
//! The feed list is compiled in. A run receives it as a value (see
//! [`crate::pipeline::RunConfig`]) so tests can swap in their own sources.
//!
//! | Platform | Feed | Default category |
//! |----------|------|------------------|
//! | 네이버 블로그 | `rss.blog.naver.com/zhstjxm2001.xml` | AEO 트렌드 분석 |
//! | 벨로그 | `api.velog.io/rss/@airism` | AEO 기술 리포트 |

use crate::models::{FeedSource, NormalizedPost};
use crate::normalize::{TECHNICAL_REPORT, TREND_ANALYSIS};
use crate::utils::utc_date;
use chrono::{DateTime, Utc};

pub const FALLBACK_DESCRIPTION: &str = "AEO 최적화 관련 최신 인사이트를 확인해보세요.";

/// The deployed feed list, in display order.
pub fn default_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::new(
            "https://rss.blog.naver.com/zhstjxm2001.xml",
            "네이버 블로그",
            TREND_ANALYSIS,
            "https://blog.naver.com/zhstjxm2001",
        ),
        FeedSource::new(
            "https://api.velog.io/rss/@airism",
            "벨로그",
            TECHNICAL_REPORT,
            "https://velog.io/@airism",
        ),
    ]
}

/// Static post shown in place of a feed that could not be fetched or parsed.
pub fn fallback_post(source: &FeedSource, now: DateTime<Utc>) -> NormalizedPost {
    NormalizedPost {
        category: source.default_category.clone(),
        title: format!("최신 {} 포스트", source.platform_label),
        description: FALLBACK_DESCRIPTION.to_string(),
        link: source.homepage.clone(),
        platform: source.platform_label.clone(),
        published_at: utc_date(now),
    }
}
