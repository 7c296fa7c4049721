//! Pure extraction from rendered HTML.
//!
//! `scraper::Html` is not `Send`, so every function here parses, reads and
//! drops the document without crossing an await point.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::app::{HarvestError, Result};
use crate::crawler::estimate::parse_number;
use crate::crawler::selectors::Selectors;
use crate::domain::Author;

static PAREN_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s\(.*\)").unwrap());
static COMMENTS_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*comments?").unwrap());
static USERNAME_DECORATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*·\s*.*").unwrap());

/// What the feed holds at a given position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSlot {
    /// No item rendered at this index; the feed is exhausted
    Exhausted,
    /// An item without a detail link (promoted or placeholder)
    Unlinked,
    Link(String),
}

/// Fields read from an entry's detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPage {
    pub published_at: DateTime<Utc>,
    pub category: String,
    pub comments: i64,
    pub upvote_percentage: i64,
    pub rating: i64,
    /// Author profile link as found in the page, usually origin-relative
    pub author_href: String,
}

pub fn parse_feed_slot(html: &str, selectors: &Selectors, index: usize) -> FeedSlot {
    let doc = Html::parse_document(html);
    let Some(post) = doc.select(&selectors.post_container).nth(index) else {
        return FeedSlot::Exhausted;
    };
    post.select(&selectors.post_link)
        .find_map(|a| a.value().attr("href"))
        .map(|href| FeedSlot::Link(href.to_string()))
        .unwrap_or(FeedSlot::Unlinked)
}

pub fn parse_entry_page(
    html: &str,
    selectors: &Selectors,
    timestamp_formats: &[String],
) -> Result<EntryPage> {
    let doc = Html::parse_document(html);

    let timestamp = text_of(&doc, &selectors.timestamp, "post timestamp")?;
    let timestamp = PAREN_SUFFIX.replace_all(&timestamp, "");
    let published_at = parse_timestamp(&timestamp, timestamp_formats)?;

    let category = doc
        .select(&selectors.category)
        .find(|el| {
            el.value()
                .attr("title")
                .is_some_and(|title| selectors.category_title.is_match(title))
        })
        .map(element_text)
        .ok_or_else(|| HarvestError::ElementNotFound("post category".into()))?;

    let comments = text_of(&doc, &selectors.comments, "comment count")?;
    let comments = parse_number(&COMMENTS_WORD.replace_all(&comments, ""))?;

    let upvoted = text_of(&doc, &selectors.upvote_percentage, "upvote percentage")?;
    let upvote_percentage = parse_number(upvoted.split('%').next().unwrap_or_default())?;

    let rating = parse_number(&text_of(&doc, &selectors.rating, "post rating")?)?;

    let author_href = doc
        .select(&selectors.author_link)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| selectors.author_href.is_match(href))
        .map(str::to_string)
        .ok_or_else(|| HarvestError::ElementNotFound("author link".into()))?;

    Ok(EntryPage {
        published_at,
        category,
        comments,
        upvote_percentage,
        rating,
        author_href,
    })
}

pub fn parse_author_page(html: &str, selectors: &Selectors) -> Result<Author> {
    let doc = Html::parse_document(html);

    let (post_karma, comment_karma) =
        parse_karma_pair(&text_of(&doc, &selectors.separated_karma, "separated karma")?)?;

    let mut karma_and_tenure = doc.select(&selectors.karma_and_tenure).map(element_text);
    let karma = karma_and_tenure
        .next()
        .ok_or_else(|| HarvestError::ElementNotFound("user karma".into()))?;
    let cake_day = karma_and_tenure
        .next()
        .ok_or_else(|| HarvestError::ElementNotFound("user cake day".into()))?;
    let karma = parse_number(&karma)?;

    let username = doc
        .select(&selectors.premium_username)
        .next()
        .or_else(|| doc.select(&selectors.default_username).next())
        .map(element_text)
        .ok_or_else(|| HarvestError::ElementNotFound("username".into()))?;
    let username = USERNAME_DECORATION.replace(&username, "").into_owned();

    Ok(Author {
        username,
        karma,
        cake_day,
        post_karma,
        comment_karma,
    })
}

/// Recover post and comment karma from the combined tooltip text.
///
/// Non-numeric tokens are dropped; the first two numeric tokens are the
/// post and comment karma in that order.
pub fn parse_karma_pair(text: &str) -> Result<(i64, i64)> {
    let mut numbers = text.split_whitespace().filter_map(|t| parse_number(t).ok());
    match (numbers.next(), numbers.next()) {
        (Some(post), Some(comment)) => Ok((post, comment)),
        _ => Err(HarvestError::Extraction(format!(
            "Expected post and comment karma in {text:?}"
        ))),
    }
}

pub fn parse_timestamp(text: &str, formats: &[String]) -> Result<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| HarvestError::Extraction(format!("Unrecognised timestamp {text:?}")))
}

fn text_of(doc: &Html, selector: &Selector, what: &str) -> Result<String> {
    doc.select(selector)
        .next()
        .map(element_text)
        .ok_or_else(|| HarvestError::ElementNotFound(what.to_string()))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
