use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::error::Error;
use std::fmt;

static QUOTES_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/quotes");

const FALLBACK: &str = "Well done. Carry this calm with you.";

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Quote {
    pub icon: String,
    pub text: String,
    pub author: String,
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' — {}", self.icon, self.text, self.author)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct QuoteBook {
    pub name: String,
    pub quotes: Vec<Quote>,
}

impl QuoteBook {
    /// The completion messages bundled into the binary.
    pub fn completion() -> Result<Self, Box<dyn Error>> {
        read_book("completion.json")
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Quote> {
        self.quotes.choose(rng)
    }
}

fn read_book(file_name: &str) -> Result<QuoteBook, Box<dyn Error>> {
    let file = QUOTES_DIR
        .get_file(file_name)
        .ok_or_else(|| format!("quote file {file_name} not found"))?;
    let contents = file
        .contents_utf8()
        .ok_or_else(|| format!("quote file {file_name} is not utf-8"))?;
    Ok(serde_json::from_str(contents)?)
}

/// A random completion message, or a plain fallback if the table is unusable.
pub fn random_completion_message() -> String {
    match QuoteBook::completion() {
        Ok(book) => book
            .choose(&mut rand::thread_rng())
            .map(ToString::to_string)
            .unwrap_or_else(|| FALLBACK.to_string()),
        Err(err) => {
            tracing::warn!(%err, "completion messages unavailable");
            FALLBACK.to_string()
        }
    }
}
