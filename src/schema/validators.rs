use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value as Json;

const DNS_SUBDOMAIN_MAX_LENGTH: usize = 253;
const DNS_SUBDOMAIN_PATTERN: &str = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$";

/// Value checks attached to an [super::Attribute].
#[derive(Clone)]
pub enum Validator {
    LengthAtLeast(usize),
    OneOf(Vec<String>),
    OneOfCaseInsensitive(Vec<String>),
    RegexMatches(Regex),
    AtLeast(i64),
    /// Kubernetes object name (DNS-1123 subdomain)
    ObjectName,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::LengthAtLeast(min) => write!(f, "LengthAtLeast({min})"),
            Validator::OneOf(values) => write!(f, "OneOf({values:?})"),
            Validator::OneOfCaseInsensitive(values) => write!(f, "OneOfCaseInsensitive({values:?})"),
            Validator::RegexMatches(regex) => write!(f, "RegexMatches({})", regex.as_str()),
            Validator::AtLeast(min) => write!(f, "AtLeast({min})"),
            Validator::ObjectName => write!(f, "ObjectName"),
        }
    }
}

impl Validator {
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Validator::OneOf(values.into_iter().map(Into::into).collect())
    }

    pub fn one_of_case_insensitive<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Validator::OneOfCaseInsensitive(values.into_iter().map(Into::into).collect())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Validator::RegexMatches(Regex::new(pattern)?))
    }

    /// Returns a description of the violation, or `None` when the value passes.
    ///
    /// Values of a type the validator does not apply to pass, the type check is done elsewhere.
    pub fn check(&self, value: &Json) -> Option<String> {
        match (self, value) {
            (Validator::LengthAtLeast(min), Json::String(s)) if s.chars().count() < *min => {
                Some(format!("string length must be at least {min}, got: {}", s.chars().count()))
            }
            (Validator::OneOf(values), Json::String(s)) if !values.contains(s) => {
                Some(format!("value must be one of: {values:?}, got: \"{s}\""))
            }
            (Validator::OneOfCaseInsensitive(values), Json::String(s))
                if !values.iter().any(|v| v.eq_ignore_ascii_case(s)) =>
            {
                Some(format!("value must be one of: {values:?}, got: \"{s}\""))
            }
            (Validator::RegexMatches(regex), Json::String(s)) if !regex.is_match(s) => Some(format!(
                "value must match regular expression '{}', got: \"{s}\"",
                regex.as_str()
            )),
            (Validator::AtLeast(min), Json::Number(n)) if n.as_i64().is_some_and(|n| n < *min) => {
                Some(format!("value must be at least {min}, got: {n}"))
            }
            (Validator::ObjectName, Json::String(s)) => check_object_name(s),
            _ => None,
        }
    }
}

fn dns_subdomain() -> &'static Result<Regex, regex::Error> {
    static REGEX: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(DNS_SUBDOMAIN_PATTERN))
}

fn check_object_name(name: &str) -> Option<String> {
    if name.len() > DNS_SUBDOMAIN_MAX_LENGTH {
        return Some(format!(
            "name must be no more than {DNS_SUBDOMAIN_MAX_LENGTH} characters, got: {}",
            name.len()
        ));
    }
    let regex = match dns_subdomain() {
        Ok(regex) => regex,
        Err(error) => return Some(format!("name pattern failed to compile: {error}")),
    };
    if regex.is_match(name) {
        None
    } else {
        Some(format!(
            "name must consist of lower case alphanumeric characters, '-' or '.', and must start and \
             end with an alphanumeric character, got: \"{name}\""
        ))
    }
}
