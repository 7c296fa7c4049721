use regex::Regex;
use scraper::Selector;

use crate::app::{HarvestError, Result};
use crate::crawler::config::SelectorConfig;

/// [`SelectorConfig`] compiled once and shared by every session.
#[derive(Debug)]
pub struct Selectors {
    pub post_container: Selector,
    /// Raw CSS for the post container, used by in-browser height lookups
    pub post_container_css: String,
    pub post_link: Selector,
    pub timestamp_trigger_css: String,
    pub timestamp_css: String,
    pub timestamp: Selector,
    pub category: Selector,
    pub category_title: Regex,
    pub comments: Selector,
    pub upvote_percentage: Selector,
    pub rating: Selector,
    pub author_link: Selector,
    pub author_href: Regex,
    pub premium_username: Selector,
    pub default_username: Selector,
    pub karma_and_tenure_css: String,
    pub karma_and_tenure: Selector,
    pub separated_karma_css: String,
    pub separated_karma: Selector,
}

impl Selectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            post_container: css(&config.post_container)?,
            post_container_css: config.post_container.clone(),
            post_link: css(&config.post_link)?,
            timestamp_trigger_css: config.timestamp_trigger.clone(),
            timestamp_css: config.timestamp.clone(),
            timestamp: css(&config.timestamp)?,
            category: css(&config.category)?,
            category_title: pattern(&config.category_title_pattern)?,
            comments: css(&config.comments)?,
            upvote_percentage: css(&config.upvote_percentage)?,
            rating: css(&config.rating)?,
            author_link: css(&config.author_link)?,
            author_href: pattern(&config.author_href_pattern)?,
            premium_username: css(&config.premium_username)?,
            default_username: css(&config.default_username)?,
            karma_and_tenure_css: config.karma_and_tenure.clone(),
            karma_and_tenure: css(&config.karma_and_tenure)?,
            separated_karma_css: config.separated_karma.clone(),
            separated_karma: css(&config.separated_karma)?,
        })
    }
}

#[inline]
fn css(sel: &str) -> Result<Selector> {
    Selector::parse(sel).map_err(|e| HarvestError::InvalidSelector(format!("{sel}: {e}")))
}

#[inline]
fn pattern(re: &str) -> Result<Regex> {
    Regex::new(re).map_err(|e| HarvestError::InvalidSelector(format!("{re}: {e}")))
}
