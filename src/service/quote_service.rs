//! Quote service: the decisions between the route handlers and the saying store

use std::sync::Arc;
use std::collections::HashSet;

use actix_web::Error;
use chrono::Local;
use log::{debug, info, warn};
use rand::seq::IndexedRandom;

use crate::config::QuotesConfig;
use crate::sayings::{Saying, SayingId, SayingStorage};
use crate::text::{clean_text, legacy_decode, normalize};

/// Timestamp format stored in the `date` column (second precision)
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A quote ready to show, with the id used for its share link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub text: String,
    pub id: SayingId,
}

/// Outcome of a submission that reached the store without errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Accepted(SayingId),
    TooShort,
    Duplicate,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted(_))
    }
}

/// Quote service built on top of a saying store
pub struct QuoteService {
    store: Arc<dyn SayingStorage>,
    rules: QuotesConfig,
}

impl QuoteService {
    /// Create a new quote service with the given store and rules
    pub fn new(store: Arc<dyn SayingStorage>, rules: QuotesConfig) -> Self {
        Self { store, rules }
    }

    /// Pick a saying uniformly at random.
    ///
    /// Fetches the ids first and then the chosen row. An empty store is a
    /// not-found error.
    pub fn get_random_quote(&self) -> Result<Quote, Error> {
        debug!("Querying DB for IDs");
        let ids = self.store.ids()?;
        let id = *ids
            .choose(&mut rand::rng())
            .ok_or_else(|| actix_web::error::ErrorNotFound("No sayings stored"))?;
        self.get_quote_by_id(id)
    }

    /// Fetch one saying by id
    pub fn get_quote_by_id(&self, id: SayingId) -> Result<Quote, Error> {
        debug!("Querying DB for specific quote {}", id);
        let saying = self.store.get_saying(id)?;
        let text = if self.rules.legacy_decoding {
            legacy_decode(&saying.saying)
        } else {
            saying.saying
        };
        Ok(Quote { text, id: saying.id })
    }

    /// True when no stored saying normalizes to the same text as `text`.
    ///
    /// This is a plain read; `submit` repeats the check under the write lock.
    pub fn check_no_dupe(&self, text: &str) -> Result<bool, Error> {
        debug!("Checking for already existing quote: {}", text);
        let existing: HashSet<String> = self
            .store
            .list_sayings()?
            .iter()
            .map(|s| normalize(&s.saying))
            .collect();

        if existing.contains(&normalize(text)) {
            warn!("Quote '{}' is a duplicate", text);
            return Ok(false);
        }
        Ok(true)
    }

    /// Clean and store `text` without any checks
    pub fn insert_quote(&self, text: &str) -> Result<SayingId, Error> {
        let cleaned = clean_text(text);
        info!("INSERTING {} into DB", cleaned);
        self.store.insert_saying(&now(), &cleaned)
    }

    /// Length check, then duplicate check and insert as one step.
    ///
    /// Too short and duplicate are ordinary outcomes; store failures are errors.
    pub fn submit(&self, text: &str) -> Result<Submission, Error> {
        if text.chars().count() <= self.rules.min_length {
            debug!("Rejecting short submission ({} chars)", text.chars().count());
            return Ok(Submission::TooShort);
        }

        let cleaned = clean_text(text);
        match self.store.insert_if_absent(&now(), &cleaned, normalize)? {
            Some(id) => {
                info!("Inserted quote {}: {}", id, cleaned);
                Ok(Submission::Accepted(id))
            }
            None => {
                warn!("Quote '{}' is a duplicate", text);
                Ok(Submission::Duplicate)
            }
        }
    }

    /// Every saying in storage order
    pub fn list_all(&self) -> Result<Vec<Saying>, Error> {
        self.store.list_sayings()
    }

    /// Sayings whose text contains `keyword`, ignoring case
    pub fn search(&self, keyword: &str) -> Result<Vec<Saying>, Error> {
        let needle = keyword.to_lowercase();
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|s| s.saying.to_lowercase().contains(&needle))
            .collect())
    }
}

fn now() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sayings::is_not_found;
    use crate::sayings::mock_store::MockSayingStore;

    fn service() -> QuoteService {
        QuoteService::new(Arc::new(MockSayingStore::new()), QuotesConfig::default())
    }

    #[test]
    fn test_random_quote_on_empty_store() {
        let err = service().get_random_quote().unwrap_err();
        assert!(is_not_found(&err));
    }

    #[test]
    fn test_random_quote_comes_from_store() {
        let service = service();
        let a = service.insert_quote("Wubba lubba dub dub").unwrap();
        let b = service.insert_quote("Get schwifty").unwrap();

        for _ in 0..20 {
            let quote = service.get_random_quote().unwrap();
            assert!(quote.id == a || quote.id == b);
            assert_eq!(quote, service.get_quote_by_id(quote.id).unwrap());
        }
    }

    #[test]
    fn test_get_quote_by_id_returns_cleaned_text() {
        let service = service();
        let id = service.insert_quote("  . Nobody exists on purpose").unwrap();
        let quote = service.get_quote_by_id(id).unwrap();
        assert_eq!(quote.text, "Nobody exists on purpose");
        assert_eq!(quote.id, id);

        assert!(is_not_found(&service.get_quote_by_id(id + 1).unwrap_err()));
    }

    #[test]
    fn test_insert_records_timestamp() {
        let store = Arc::new(MockSayingStore::new());
        let service = QuoteService::new(store.clone(), QuotesConfig::default());
        let id = service.insert_quote("Show me what you got").unwrap();

        let saying = store.get_saying(id).unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(&saying.date, DATE_FORMAT).is_ok());
    }

    #[test]
    fn test_check_no_dupe() {
        let service = service();
        assert!(service.check_no_dupe("I'm Pickle Rick!").unwrap());
        service.insert_quote("I'm Pickle Rick!").unwrap();
        assert!(!service.check_no_dupe("im pickle rick").unwrap());
        assert!(!service.check_no_dupe("...I'm Pickle Rick").unwrap());
        assert!(service.check_no_dupe("I'm Pickle Morty!").unwrap());
    }

    #[test]
    fn test_submit_length_threshold() {
        let service = service();
        assert_eq!(service.submit("abcd").unwrap(), Submission::TooShort);
        assert!(service.submit("abcde").unwrap().is_accepted());
        // Too short wins over duplicate
        assert_eq!(service.submit("abcd").unwrap(), Submission::TooShort);
    }

    #[test]
    fn test_submit_length_counts_characters() {
        let service = service();
        assert_eq!(service.submit("ääää").unwrap(), Submission::TooShort);
        assert!(service.submit("äääää").unwrap().is_accepted());
    }

    #[test]
    fn test_submit_custom_length() {
        let rules = QuotesConfig { min_length: 10, ..QuotesConfig::default() };
        let service = QuoteService::new(Arc::new(MockSayingStore::new()), rules);
        assert_eq!(service.submit("0123456789").unwrap(), Submission::TooShort);
        assert!(service.submit("0123456789a").unwrap().is_accepted());
    }

    #[test]
    fn test_submit_rejects_normalized_duplicates() {
        let service = service();
        let first = service.submit("Wubba Lubba Dub-Dub!").unwrap();
        assert!(first.is_accepted());
        assert_eq!(service.submit("wubba lubba dub dub").unwrap(), Submission::Duplicate);
        assert_eq!(service.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_submitted_text_is_listed() {
        let service = service();
        let text = "\t..Don't think about it";
        let Submission::Accepted(id) = service.submit(text).unwrap() else {
            panic!("submission should be accepted");
        };

        let listed = service.list_all().unwrap();
        assert!(listed.iter().any(|s| s.id == id && normalize(&s.saying) == normalize(text)));
        assert_eq!(service.get_quote_by_id(id).unwrap().text, "Don't think about it");
    }

    #[test]
    fn test_submit_propagates_store_failure() {
        let service = QuoteService::new(Arc::new(MockSayingStore::failing_writes()), QuotesConfig::default());
        assert!(service.submit("This will not be stored").is_err());
        assert!(service.insert_quote("Neither will this").is_err());
    }

    #[test]
    fn test_search() {
        let service = service();
        service.insert_quote("Foo fighters").unwrap();
        service.insert_quote("Get schwifty").unwrap();
        service.insert_quote("the FOOBAR incident").unwrap();

        let all = service.list_all().unwrap();
        let expected: Vec<Saying> = all
            .iter()
            .filter(|s| s.saying.to_lowercase().contains("foo"))
            .cloned()
            .collect();

        let results = service.search("foo").unwrap();
        assert_eq!(results, expected);
        assert_eq!(results.len(), 2);

        assert_eq!(service.search("FOO").unwrap(), expected);
        assert!(service.search("plumbus").unwrap().is_empty());
    }

    #[test]
    fn test_legacy_decoding_applies_to_retrieval_only() {
        let rules = QuotesConfig { legacy_decoding: true, ..QuotesConfig::default() };
        let service = QuoteService::new(Arc::new(MockSayingStore::new()), rules);
        let id = service.insert_quote("caf\u{c3}\u{a9} rick").unwrap();

        assert_eq!(service.get_quote_by_id(id).unwrap().text, "café rick");
        assert_eq!(service.list_all().unwrap()[0].saying, "caf\u{c3}\u{a9} rick");
    }
}
