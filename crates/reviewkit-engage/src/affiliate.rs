//! Affiliate click log and the reports built over it.
//!
//! The log is a bounded list; once it exceeds the configured capacity the
//! oldest entries are dropped. Recording a click never blocks navigation and
//! carries no user-facing notice.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Duration, NaiveDate};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::Rng;
use reviewkit_core::{AffiliateClick, SiteConfig};
use reviewkit_store::{read_json_or, KvStore, StorageKey};
use serde::Serialize;

use crate::clock::Clock;
use crate::engagement::Engagement;
use crate::error::EngageError;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SESSION_SUFFIX_LEN: usize = 8;
const TOP_SITES: usize = 5;
const DAILY_WINDOW: usize = 7;
const RECENT_CLICKS: usize = 10;

/// Characters left alone by a URI component encoder.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickStats {
    pub total_clicks: usize,
    pub unique_sessions: usize,
    /// Busiest sites first, ties by name.
    pub top_sites: Vec<(String, usize)>,
    pub by_category: BTreeMap<String, usize>,
    /// The most recent days that have clicks, oldest first.
    pub daily: Vec<(NaiveDate, usize)>,
    pub recent: Vec<AffiliateClick>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversions {
    pub today: NaiveDate,
    pub today_clicks: usize,
    pub yesterday_clicks: usize,
    pub today_sites: Vec<(String, usize)>,
}

fn count_sorted<'a>(names: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, n)| (name.to_string(), n))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

/// Path component of `url`, `/` if there is none.
fn page_path(url: &str) -> String {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    match rest.find('/') {
        Some(idx) => {
            let path = &rest[idx..];
            let end = path.find(['?', '#']).unwrap_or(path.len());
            path[..end].to_string()
        }
        None => "/".to_string(),
    }
}

fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..SESSION_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect()
}

/// Link for a creator card: the explicit `url` when given, otherwise the
/// on-site detail route.
#[must_use]
pub fn creator_url(creator_id: &str, url: Option<&str>) -> String {
    match url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => url.to_string(),
        None => format!(
            "/creators/{}",
            utf8_percent_encode(creator_id, URI_COMPONENT)
        ),
    }
}

impl<S: KvStore, C: Clock> Engagement<S, C> {
    /// Identifier shared by every click recorded through this value,
    /// generated on first use as `sess_<unix-millis>_<suffix>`.
    pub fn session_id(&mut self) -> String {
        if let Some(id) = &self.session_id {
            return id.clone();
        }
        let id = format!(
            "sess_{}_{}",
            self.clock.now().timestamp_millis(),
            random_suffix()
        );
        self.session_id = Some(id.clone());
        id
    }

    #[must_use]
    pub fn clicks(&self) -> Vec<AffiliateClick> {
        read_json_or(&self.store, StorageKey::AffiliateClicks)
    }

    /// Append a click. `url` defaults to the configured page url.
    ///
    /// # Errors
    ///
    /// Returns [`EngageError::Store`] if the log cannot be persisted.
    pub fn track_click(
        &mut self,
        site: &str,
        category: Option<&str>,
        url: Option<&str>,
    ) -> Result<AffiliateClick, EngageError> {
        let page_url = self.settings.page_url.clone();
        let click = AffiliateClick {
            site: site.to_string(),
            category: category.unwrap_or_default().to_string(),
            url: url
                .filter(|u| !u.is_empty())
                .map_or_else(|| page_url.clone(), ToString::to_string),
            timestamp: self.clock.now(),
            page: page_path(&page_url),
            referrer: "direct".to_string(),
            session_id: self.session_id(),
        };

        let mut clicks = self.clicks();
        clicks.push(click.clone());
        let capacity = self.settings.click_log_capacity;
        if clicks.len() > capacity {
            let overflow = clicks.len() - capacity;
            clicks.drain(..overflow);
        }
        self.persist(StorageKey::AffiliateClicks, &clicks)?;

        tracing::info!(
            site = %click.site,
            category = %click.category,
            total_clicks = clicks.len(),
            "affiliate click recorded"
        );
        Ok(click)
    }

    /// Record a click on a catalog site.
    ///
    /// # Errors
    ///
    /// See [`Engagement::track_click`].
    pub fn track_site(&mut self, site: &SiteConfig) -> Result<AffiliateClick, EngageError> {
        self.track_click(&site.name, Some(&site.category), Some(&site.url))
    }

    /// Summary of the click log, `None` while it is empty.
    #[must_use]
    pub fn click_stats(&self) -> Option<ClickStats> {
        let clicks = self.clicks();
        if clicks.is_empty() {
            return None;
        }

        let unique_sessions = clicks
            .iter()
            .map(|c| c.session_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        let mut top_sites = count_sorted(clicks.iter().map(|c| c.site.as_str()));
        top_sites.truncate(TOP_SITES);

        let mut by_category = BTreeMap::new();
        for click in clicks.iter().filter(|c| !c.category.is_empty()) {
            *by_category.entry(click.category.clone()).or_insert(0) += 1;
        }

        let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for click in &clicks {
            *per_day.entry(click.timestamp.date_naive()).or_insert(0) += 1;
        }
        let skip = per_day.len().saturating_sub(DAILY_WINDOW);
        let daily = per_day.into_iter().skip(skip).collect();

        let recent_from = clicks.len().saturating_sub(RECENT_CLICKS);
        Some(ClickStats {
            total_clicks: clicks.len(),
            unique_sessions,
            top_sites,
            by_category,
            daily,
            recent: clicks[recent_from..].to_vec(),
        })
    }

    /// Click counts for `today` and the day before, in UTC date buckets.
    #[must_use]
    pub fn conversions(&self, today: NaiveDate) -> Conversions {
        let yesterday = today - Duration::days(1);
        let clicks = self.clicks();

        let todays: Vec<&AffiliateClick> = clicks
            .iter()
            .filter(|c| c.timestamp.date_naive() == today)
            .collect();
        let yesterday_clicks = clicks
            .iter()
            .filter(|c| c.timestamp.date_naive() == yesterday)
            .count();

        Conversions {
            today,
            today_clicks: todays.len(),
            yesterday_clicks,
            today_sites: count_sorted(todays.iter().map(|c| c.site.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engagement::test_support::{engagement, launch};

    #[test]
    fn session_id_is_generated_once() {
        let (mut eng, _clock) = engagement();
        let id = eng.session_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "sess");
        assert_eq!(parts[1], launch().timestamp_millis().to_string());
        assert_eq!(parts[2].len(), SESSION_SUFFIX_LEN);
        assert!(parts[2].bytes().all(|b| BASE36.contains(&b)));
        assert_eq!(eng.session_id(), id);
    }

    #[test]
    fn click_defaults_to_page_url_and_direct_referrer() {
        let (mut eng, _clock) = engagement();
        let click = eng.track_click("CamHub", None, None).unwrap();
        assert_eq!(click.url, eng.settings().page_url);
        assert_eq!(click.page, "/");
        assert_eq!(click.referrer, "direct");
        assert!(click.category.is_empty());
        assert_eq!(eng.clicks(), vec![click]);
    }

    #[test]
    fn log_keeps_only_newest_entries() {
        let (mut eng, _clock) = engagement();
        eng.settings.click_log_capacity = 3;
        for i in 0..5 {
            eng.track_click(&format!("site-{i}"), Some("cam"), None)
                .unwrap();
        }
        let sites: Vec<String> = eng.clicks().into_iter().map(|c| c.site).collect();
        assert_eq!(sites, vec!["site-2", "site-3", "site-4"]);
    }

    #[test]
    fn default_log_holds_a_thousand_clicks() {
        let (mut eng, _clock) = engagement();
        assert_eq!(eng.settings.click_log_capacity, 1000);
        for i in 0..=1000 {
            eng.track_click(&format!("site-{i}"), Some("cam"), None)
                .unwrap();
        }
        let clicks = eng.clicks();
        assert_eq!(clicks.len(), 1000);
        assert_eq!(clicks[0].site, "site-1");
        assert_eq!(clicks[999].site, "site-1000");
        assert!(clicks.iter().all(|c| c.site != "site-0"));
    }

    #[test]
    fn stats_are_none_for_empty_log() {
        let (eng, _clock) = engagement();
        assert!(eng.click_stats().is_none());
    }

    #[test]
    fn stats_rank_sites_and_bucket_days() {
        let (mut eng, clock) = engagement();
        eng.track_click("CamHub", Some("cam"), None).unwrap();
        eng.track_click("FanVault", Some("premium"), None).unwrap();
        clock.advance(Duration::days(1));
        eng.track_click("CamHub", Some("cam"), None).unwrap();
        eng.track_click("CamHub", None, None).unwrap();

        let stats = eng.click_stats().unwrap();
        assert_eq!(stats.total_clicks, 4);
        assert_eq!(stats.unique_sessions, 1);
        assert_eq!(stats.top_sites[0], ("CamHub".to_string(), 3));
        assert_eq!(stats.by_category.get("cam"), Some(&2));
        assert_eq!(stats.by_category.get("premium"), Some(&1));
        assert_eq!(
            stats.daily,
            vec![
                (launch().date_naive(), 2),
                (launch().date_naive() + Duration::days(1), 2)
            ]
        );
        assert_eq!(stats.recent.len(), 4);
    }

    #[test]
    fn daily_stats_cover_last_seven_active_days() {
        let (mut eng, clock) = engagement();
        for _ in 0..10 {
            eng.track_click("CamHub", None, None).unwrap();
            clock.advance(Duration::days(1));
        }
        let stats = eng.click_stats().unwrap();
        assert_eq!(stats.daily.len(), DAILY_WINDOW);
        assert_eq!(stats.daily[0].0, launch().date_naive() + Duration::days(3));
    }

    #[test]
    fn conversions_split_today_and_yesterday() {
        let (mut eng, clock) = engagement();
        eng.track_click("FanVault", None, None).unwrap();
        clock.advance(Duration::days(1));
        eng.track_click("CamHub", None, None).unwrap();
        eng.track_click("CamHub", None, None).unwrap();

        let conv = eng.conversions(clock.now().date_naive());
        assert_eq!(conv.today_clicks, 2);
        assert_eq!(conv.yesterday_clicks, 1);
        assert_eq!(conv.today_sites, vec![("CamHub".to_string(), 2)]);
    }

    #[test]
    fn catalog_site_fills_category_and_url() {
        let (mut eng, _clock) = engagement();
        let site = SiteConfig {
            name: "CamHub".to_string(),
            category: "cam".to_string(),
            url: "https://camhub.example/join".to_string(),
            notes: None,
        };
        let click = eng.track_site(&site).unwrap();
        assert_eq!(click.category, "cam");
        assert_eq!(click.url, "https://camhub.example/join");
    }

    #[test]
    fn creator_url_prefers_explicit_link() {
        assert_eq!(
            creator_url("luna", Some("https://fans.example/luna")),
            "https://fans.example/luna"
        );
        assert_eq!(creator_url("luna rose&co", None), "/creators/luna%20rose%26co");
        assert_eq!(creator_url("it's-(me)", Some("  ")), "/creators/it's-(me)");
    }

    #[test]
    fn page_path_strips_host_and_query() {
        assert_eq!(page_path("https://example.com/reviews/luna?x=1"), "/reviews/luna");
        assert_eq!(page_path("https://example.com"), "/");
    }
}
