//! Function-call fields (`!fn domain.module(args)[index]`) and the registry
//! of domain providers that answer them.

use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, LazyLock},
};

use regex::Regex;
use tracing::{debug, trace};

use crate::{application::ports::FunctionProvider, domain::DomainError};

static CALL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\w+)\.(\w+)\(([,/\-:.\s\w]*)\)(?:\.(\w*)|\[(\d+)\])?\s*$")
        .unwrap_or_else(|e| unreachable!("function call pattern is valid: {e}"))
});

// ── FnCall ───────────────────────────────────────────────────────────────────

/// A parsed `domain.module(p1, p2)[index]` / `domain.module(...).attr` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FnCall {
    pub domain: String,
    pub module: String,
    pub params: Vec<String>,
    /// Empty means "no attribute".
    pub attr: String,
    /// `None` means "the whole result list".
    pub index: Option<usize>,
}

impl FnCall {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let caps = CALL_PATTERN
            .captures(raw)
            .ok_or_else(|| DomainError::InvalidFunctionCall {
                call: raw.to_owned(),
                reason: "expected domain.module(args), optionally followed by [index] or .attribute"
                    .into(),
            })?;

        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());

        let params = match group(3).trim() {
            "" => Vec::new(),
            list => list.split(',').map(|p| p.trim().to_owned()).collect(),
        };

        let index = match caps.get(5) {
            Some(m) => Some(m.as_str().parse::<usize>().map_err(|e| {
                DomainError::InvalidFunctionCall {
                    call: raw.to_owned(),
                    reason: format!("index is not a number: {e}"),
                }
            })?),
            None => None,
        };

        Ok(Self {
            domain: group(1).to_owned(),
            module: group(2).to_owned(),
            params,
            attr: group(4).to_owned(),
            index,
        })
    }
}

impl fmt::Display for FnCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.domain, self.module, self.params.join(", "))?;
        if !self.attr.is_empty() {
            write!(f, ".{}", self.attr)?;
        }
        if let Some(i) = self.index {
            write!(f, "[{i}]")?;
        }
        Ok(())
    }
}

// ── FnResult ─────────────────────────────────────────────────────────────────

/// What a provider returns: an ordered list and/or named attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FnResult {
    pub values: Vec<String>,
    pub attributes: BTreeMap<String, String>,
}

impl FnResult {
    pub fn list(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn single(value: impl Into<String>) -> Self {
        Self::list([value.into()])
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Select an attribute or one element. Empty `attr` and `None` index
    /// return the whole list.
    pub fn project(&self, attr: &str, index: Option<usize>) -> Result<Vec<String>, String> {
        if !attr.is_empty() {
            return self
                .attributes
                .get(attr)
                .map(|v| vec![v.clone()])
                .ok_or_else(|| format!("attribute '{attr}' is not available"));
        }
        match index {
            Some(i) => self
                .values
                .get(i)
                .map(|v| vec![v.clone()])
                .ok_or_else(|| format!("index {i} doesn't exist in the result")),
            None => Ok(self.values.clone()),
        }
    }
}

// ── FunctionRegistry ─────────────────────────────────────────────────────────

/// Maps domain names (`aws`, `k8s`, `os`, `version`) to providers.
///
/// Providers are shared read-only, so one registry can serve concurrent
/// resolutions.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    providers: BTreeMap<String, Arc<dyn FunctionProvider>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, domain: impl Into<String>, provider: Arc<dyn FunctionProvider>) -> Self {
        self.providers.insert(domain.into(), provider);
        self
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Invoke `domain.module(params)` and return the raw result.
    pub fn call(&self, domain: &str, module: &str, params: &[String]) -> Result<FnResult, DomainError> {
        let provider = self
            .providers
            .get(domain)
            .ok_or_else(|| DomainError::UnknownFunction {
                domain: domain.to_owned(),
                module: module.to_owned(),
            })?;

        trace!(domain, module, ?params, "calling function provider");
        provider.call(module, params).map_err(|e| match e {
            crate::error::BlueprintError::Domain(d) => d,
            other => DomainError::FunctionCall {
                call: format!("{domain}.{module}"),
                reason: other.to_string(),
            },
        })
    }

    /// Parse, call and project a `!fn` field body.
    pub fn evaluate(&self, raw: &str) -> Result<Vec<String>, DomainError> {
        let call = FnCall::parse(raw)?;
        let result = self.call(&call.domain, &call.module, &call.params)?;
        let projected = result
            .project(&call.attr, call.index)
            .map_err(|reason| DomainError::InvalidFunctionCall {
                call: raw.to_owned(),
                reason,
            })?;
        debug!(call = %call, results = projected.len(), "function evaluated");
        Ok(projected)
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("domains", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}
