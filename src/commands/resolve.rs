//! Mapping user-supplied names to content entries.

use anyhow::{Result, bail};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::content::{ContentFilter, ContentRepository, clean_name};
use crate::output;

/// How one requested name was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// An entry has exactly this name, ignoring case.
    Exact(String),
    /// No exact match; the closest entry was taken.
    Assumed {
        /// Name as typed.
        query: String,
        /// Entry that was picked.
        name: String,
    },
    /// No exact match; the closest entry is only suggested.
    Suggested {
        /// Name as typed.
        query: String,
        /// Entry that resembles it.
        name: String,
    },
    /// Nothing resembles the name.
    Missing(String),
}

impl Resolution {
    /// Entry to act on, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        match self {
            Self::Exact(name) | Self::Assumed { name, .. } => Some(name),
            Self::Suggested { .. } | Self::Missing(_) => None,
        }
    }
}

/// Resolve `query` against entry display names.
///
/// With `assume`, the best fuzzy match stands in for a name that does not
/// exist; otherwise it is only suggested.
pub fn resolve<'a, I>(query: &str, names: I, assume: bool) -> Resolution
where
    I: IntoIterator<Item = &'a str>,
{
    let wanted = clean_name(query);
    let matcher = SkimMatcherV2::default();
    let mut best: Option<(i64, &str)> = None;

    for name in names {
        let clean = clean_name(name);
        if clean == wanted {
            return Resolution::Exact(name.to_string());
        }

        let Some(score) = matcher.fuzzy_match(&clean, &wanted) else {
            continue;
        };
        let better = best.is_none_or(|(best_score, best_name)| {
            score > best_score || (score == best_score && name.len() < best_name.len())
        });
        if better {
            best = Some((score, name));
        }
    }

    match best {
        Some((_, name)) if assume => Resolution::Assumed {
            query: query.to_string(),
            name: name.to_string(),
        },
        Some((_, name)) => Resolution::Suggested {
            query: query.to_string(),
            name: name.to_string(),
        },
        None => Resolution::Missing(query.to_string()),
    }
}

/// Build a filter from command-line names, reporting every inexact match.
///
/// An empty `queries` list selects everything.
///
/// # Errors
///
/// Returns an error if names were given but none of them resolved.
pub fn resolve_filter(repo: &ContentRepository, queries: &[String], assume: bool) -> Result<ContentFilter> {
    let mut filter = ContentFilter::all();
    if queries.is_empty() {
        return Ok(filter);
    }

    for query in queries {
        let resolution = resolve(query, repo.entries().map(|e| e.nice_name.as_str()), assume);
        match &resolution {
            Resolution::Exact(_) => {}
            Resolution::Assumed { query, name } => {
                output::info(&format!("Could not find '{query}', assuming '{name}'"));
            }
            Resolution::Suggested { query, name } => {
                output::warning(&format!("Could not find '{query}', did you mean '{name}'?"));
            }
            Resolution::Missing(query) => {
                output::warning(&format!("Could not find '{query}'"));
            }
        }
        if let Some(name) = resolution.selected() {
            filter.insert(name);
        }
    }

    if filter.is_empty() {
        bail!("None of the given names match any content");
    }
    Ok(filter)
}
