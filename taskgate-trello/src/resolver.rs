//! Fuzzy name resolution.
//!
//! Maps free-text assignee handles, label names and list names to board
//! IDs. Everything here is a pure function over snapshots the caller has
//! already fetched; no network calls are made.
//!
//! Unmatched names are dropped, never errors. Each resolution reports which
//! inputs were dropped so callers can surface the count.

use std::collections::BTreeMap;

use serde::Serialize;
use taskgate_core::{BoardList, Label, Member};
use tracing::debug;

/// A label is accepted only below this edit distance.
pub const LABEL_DISTANCE_LIMIT: usize = 3;

/// Built-in aliases: canonical username to informal spellings.
const BUILTIN_ALIASES: &[(&str, &[&str])] = &[
    ("ziyaeyuboglu", &["ziya", "ziyaeyuboglu", "ziyaeyu"]),
    ("infoalieweb3", &["berkay", "infoalieweb3", "infoalie", "alieweb3"]),
    ("alkannakliyat", &["tuncer", "alkannakliyat", "alkann"]),
];

// ============================================================================
// Results
// ============================================================================

/// Outcome of resolving one free-text name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateMatch {
    /// The name as supplied.
    pub source: String,
    /// Resolved ID, if any candidate qualified.
    pub resolved_id: Option<String>,
    /// Edit distance of the accepted candidate, for fuzzy matches.
    pub distance: Option<usize>,
}

impl CandidateMatch {
    fn matched(source: &str, id: &str, distance: Option<usize>) -> Self {
        Self {
            source: source.to_string(),
            resolved_id: Some(id.to_string()),
            distance,
        }
    }

    fn unmatched(source: &str) -> Self {
        Self {
            source: source.to_string(),
            resolved_id: None,
            distance: None,
        }
    }
}

/// Resolved IDs plus the per-name detail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Distinct resolved IDs in first-occurrence order.
    pub ids: Vec<String>,
    /// One entry per input name, in input order.
    pub matches: Vec<CandidateMatch>,
}

impl Resolution {
    fn from_matches(matches: Vec<CandidateMatch>) -> Self {
        let mut ids: Vec<String> = Vec::new();
        for id in matches.iter().filter_map(|m| m.resolved_id.as_ref()) {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        Self { ids, matches }
    }

    /// Returns the input names that resolved to nothing.
    pub fn unmatched(&self) -> Vec<&str> {
        self.matches
            .iter()
            .filter(|m| m.resolved_id.is_none())
            .map(|m| m.source.as_str())
            .collect()
    }

    /// Returns how many input names were dropped.
    pub fn dropped(&self) -> usize {
        self.matches.iter().filter(|m| m.resolved_id.is_none()).count()
    }
}

// ============================================================================
// Text helpers
// ============================================================================

/// Lowercases and trims.
pub fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Levenshtein distance over Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Lowercases and maps Turkish letters to their ASCII base.
pub fn fold_turkish(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            'ı' => Some('i'),
            'ğ' => Some('g'),
            'ü' => Some('u'),
            'ş' => Some('s'),
            'ö' => Some('o'),
            'ç' => Some('c'),
            // Combining dot left behind by lowercasing 'İ'.
            '\u{0307}' => None,
            other => Some(other),
        })
        .collect()
}

// ============================================================================
// Aliases
// ============================================================================

/// Informal spellings of known member handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<(String, Vec<String>)>,
}

impl AliasTable {
    /// Returns the built-in table.
    pub fn builtin() -> Self {
        let entries = BUILTIN_ALIASES
            .iter()
            .map(|(canonical, aliases)| {
                (
                    (*canonical).to_string(),
                    aliases.iter().map(|a| (*a).to_string()).collect(),
                )
            })
            .collect();
        Self { entries }
    }

    /// Returns an empty table.
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Adds entries. Aliases of an existing handle are appended to it.
    #[must_use]
    pub fn extend(mut self, extra: &BTreeMap<String, Vec<String>>) -> Self {
        for (canonical, aliases) in extra {
            let canonical = normalize_text(canonical);
            let aliases = aliases.iter().map(|a| normalize_text(a));
            match self.entries.iter_mut().find(|(c, _)| *c == canonical) {
                Some((_, existing)) => existing.extend(aliases),
                None => self.entries.push((canonical, aliases.collect())),
            }
        }
        self
    }

    /// Returns the canonical handle for `query`, or `query` itself.
    ///
    /// Entries are checked in table order; the first hit wins.
    pub fn canonicalize<'a>(&'a self, query: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|a| a == query))
            .map_or(query, |(canonical, _)| canonical.as_str())
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// Member matchers
// ============================================================================

type MemberMatcher = fn(&Member, &str) -> bool;

/// Member matchers, tried in order over the whole member list.
const MEMBER_MATCHERS: &[(&str, MemberMatcher)] = &[
    ("username", matches_username),
    ("full_name", matches_full_name),
    ("partial", matches_partially),
];

fn full_name_lower(member: &Member) -> Option<String> {
    member.full_name.as_deref().map(str::to_lowercase)
}

fn matches_username(member: &Member, query: &str) -> bool {
    member.username.to_lowercase() == query
}

fn matches_full_name(member: &Member, query: &str) -> bool {
    full_name_lower(member).is_some_and(|name| name == query || name.contains(query))
}

fn matches_partially(member: &Member, query: &str) -> bool {
    member.username.to_lowercase().contains(query)
        || full_name_lower(member)
            .is_some_and(|name| name.split(' ').any(|part| part.starts_with(query)))
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves free-text names against board snapshots.
#[derive(Debug, Clone, Default)]
pub struct EntityResolver {
    aliases: AliasTable,
}

impl EntityResolver {
    /// Creates a resolver with the given alias table.
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    /// Returns the alias table.
    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Finds the member a single handle refers to.
    ///
    /// A leading `@` is ignored. Aliases are substituted before matching.
    pub fn find_member<'m>(&self, name: &str, members: &'m [Member]) -> Option<&'m Member> {
        let query = normalize_text(name.trim().trim_start_matches('@'));
        if query.is_empty() {
            return None;
        }
        let target = self.aliases.canonicalize(&query);

        MEMBER_MATCHERS.iter().find_map(|(strategy, matcher)| {
            let found = members.iter().find(|m| matcher(*m, target))?;
            debug!(name, strategy, username = %found.username, "Member matched");
            Some(found)
        })
    }

    /// Resolves assignee names to member IDs.
    pub fn resolve_assignees(&self, names: &[String], members: &[Member]) -> Resolution {
        let matches = names
            .iter()
            .map(|name| match self.find_member(name, members) {
                Some(member) => CandidateMatch::matched(name, &member.id, None),
                None => {
                    debug!(name = %name, "No member matched");
                    CandidateMatch::unmatched(name)
                }
            })
            .collect();
        Resolution::from_matches(matches)
    }

    /// Resolves label names to label IDs by edit distance.
    pub fn resolve_labels(&self, names: &[String], labels: &[Label]) -> Resolution {
        let matches = names
            .iter()
            .map(|name| match closest_label(name, labels) {
                Some((label, distance)) => CandidateMatch::matched(name, &label.id, Some(distance)),
                None => CandidateMatch::unmatched(name),
            })
            .collect();
        Resolution::from_matches(matches)
    }

    /// Finds an open list whose name contains, or is contained in, `name`.
    ///
    /// Comparison folds Turkish letters, so `yapilacaklar` finds
    /// `Yapılacaklar`.
    pub fn resolve_list<'l>(&self, name: &str, lists: &'l [BoardList]) -> Option<&'l BoardList> {
        let wanted = fold_turkish(name);
        if wanted.is_empty() {
            return None;
        }
        lists.iter().filter(|l| !l.closed).find(|l| {
            let candidate = fold_turkish(&l.name);
            !candidate.is_empty() && (candidate.contains(&wanted) || wanted.contains(&candidate))
        })
    }

    /// Picks the list for cards that name none.
    ///
    /// The first keyword contained in an open list's name wins; otherwise
    /// the first open list.
    pub fn default_list<'l>(
        &self,
        lists: &'l [BoardList],
        keywords: &[String],
    ) -> Option<&'l BoardList> {
        let open = || lists.iter().filter(|l| !l.closed);
        keywords
            .iter()
            .map(|k| fold_turkish(k))
            .filter(|k| !k.is_empty())
            .find_map(|keyword| open().find(|l| fold_turkish(&l.name).contains(&keyword)))
            .or_else(|| open().next())
    }
}

/// Returns the label nearest to `name`, if nearer than the limit.
///
/// Ties keep the first label in board order. A color-only label has an
/// empty name, so it is within the limit of any query of two characters
/// or fewer and wins over longer names.
fn closest_label<'l>(name: &str, labels: &'l [Label]) -> Option<(&'l Label, usize)> {
    let wanted = normalize_text(name);
    let mut best: Option<(&Label, usize)> = None;
    for label in labels {
        let distance = levenshtein(&wanted, &normalize_text(&label.name));
        let limit = best.map_or(LABEL_DISTANCE_LIMIT, |(_, d)| d);
        if distance < limit {
            best = Some((label, distance));
        }
    }
    best
}

// ============================================================================
// Tests
// ============================================================================
