//! Namespace routing for dot-separated keys.
//!
//! Keys that are not flat machine attributes are matched against [`RULES`]
//! in order; the first rule that matches decides which section receives
//! the rest of the path. Adding a namespace means adding a rule and a
//! [`Target`], not touching the dispatch code.

use crate::entry::SectionIndex;

/// The section a routed key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    UsbBus,
    Vmci,
    Interface,
    PciBridge,
    UsbPort,
    SharedFolders,
    Share,
}

/// How an indexed rule treats a prefix followed by something other than
/// a decimal index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadIndex {
    /// Not this namespace after all; the key stays unrouted.
    Decline,
    /// The key is skipped with a warning.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// The whole key equals this string; the last segment is forwarded.
    Key(&'static str),
    /// The first segment equals this string.
    Segment(&'static str),
    /// The first segment is this prefix followed by a decimal index.
    Indexed {
        prefix: &'static str,
        on_bad_index: BadIndex,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub matcher: Matcher,
    pub target: Target,
}

const fn rule(matcher: Matcher, target: Target) -> Rule {
    Rule { matcher, target }
}

const fn indexed(prefix: &'static str, on_bad_index: BadIndex) -> Matcher {
    Matcher::Indexed {
        prefix,
        on_bad_index,
    }
}

/// Routing rules, highest priority first.
pub static RULES: &[Rule] = &[
    rule(Matcher::Segment("usb"), Target::UsbBus),
    rule(indexed("vmci", BadIndex::Decline), Target::Vmci),
    rule(indexed("ethernet", BadIndex::Decline), Target::Interface),
    rule(indexed("pciBridge", BadIndex::Decline), Target::PciBridge),
    rule(indexed("usb:", BadIndex::Skip), Target::UsbPort),
    rule(Matcher::Key("sharedFolder.maxNum"), Target::SharedFolders),
    rule(indexed("sharedFolder", BadIndex::Skip), Target::Share),
];

/// Where a key goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'k> {
    Section {
        target: Target,
        index: SectionIndex,
        rest: Vec<&'k str>,
    },
    /// Matched an indexed namespace but the index is not a number.
    BadIndex {
        target: Target,
        segment: &'k str,
    },
    Unrouted,
}

/// Result of matching a segment against an indexed prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexMatch {
    NoMatch,
    Index(SectionIndex),
    /// The prefix matched but what follows is not a run of decimal digits.
    Invalid,
}

/// Parse the decimal index following `prefix` in `segment`.
pub fn extract_index(segment: &str, prefix: &str) -> IndexMatch {
    let Some(suffix) = segment.strip_prefix(prefix) else {
        return IndexMatch::NoMatch;
    };
    match SectionIndex::from_digits(suffix) {
        Some(index) => IndexMatch::Index(index),
        None => IndexMatch::Invalid,
    }
}

pub fn route(key: &str) -> Route<'_> {
    route_with(RULES, key)
}

pub fn route_with<'k>(rules: &[Rule], key: &'k str) -> Route<'k> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((&first, rest)) = parts.split_first() else {
        return Route::Unrouted;
    };

    for rule in rules {
        match rule.matcher {
            Matcher::Key(literal) if key == literal => {
                return Route::Section {
                    target: rule.target,
                    index: SectionIndex::default(),
                    rest: parts.last().copied().into_iter().collect(),
                };
            }
            Matcher::Segment(name) if first == name => {
                return Route::Section {
                    target: rule.target,
                    index: SectionIndex::default(),
                    rest: rest.to_vec(),
                };
            }
            Matcher::Indexed {
                prefix,
                on_bad_index,
            } => match extract_index(first, prefix) {
                IndexMatch::Index(index) => {
                    return Route::Section {
                        target: rule.target,
                        index,
                        rest: rest.to_vec(),
                    };
                }
                IndexMatch::Invalid if on_bad_index == BadIndex::Skip => {
                    return Route::BadIndex {
                        target: rule.target,
                        segment: first,
                    };
                }
                IndexMatch::Invalid | IndexMatch::NoMatch => {}
            },
            _ => {}
        }
    }

    Route::Unrouted
}
