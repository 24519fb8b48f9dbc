//! Parameter resolution
//!
//! Parameters may reference each other with `%name%` placeholders. A value
//! that is exactly one placeholder takes the referenced value with its type;
//! placeholders embedded in a longer string are interpolated as text. `%%`
//! stands for a literal percent sign.

use std::collections::BTreeMap;
use weaver_domain::constants::PARAMETER_DELIMITER;
use weaver_domain::error::{Error, Result};
use weaver_domain::registry::ParameterBag;
use weaver_domain::value_objects::Literal;

/// Resolves parameter values against a bag, memoizing finished names
///
/// Values of a frozen bag are already resolved and are returned as stored.
pub struct ParameterResolver<'a> {
    bag: &'a ParameterBag,
    resolved: BTreeMap<String, Literal>,
}

impl<'a> ParameterResolver<'a> {
    /// Create a resolver over `bag`
    pub fn new(bag: &'a ParameterBag) -> Self {
        Self {
            bag,
            resolved: BTreeMap::new(),
        }
    }

    /// Resolve every parameter of the bag
    pub fn resolve_all(mut self) -> Result<BTreeMap<String, Literal>> {
        let bag = self.bag;
        for name in bag.all().keys() {
            let mut stack = Vec::new();
            self.resolve_named(name, None, &mut stack)?;
        }
        Ok(self.resolved)
    }

    /// Resolve one named parameter
    pub fn resolve(&mut self, name: &str, referenced_by: Option<&str>) -> Result<Literal> {
        let mut stack = Vec::new();
        self.resolve_named(name, referenced_by, &mut stack)
    }

    /// Interpolate placeholders inside an arbitrary literal
    pub fn resolve_value(&mut self, value: &Literal, referenced_by: Option<&str>) -> Result<Literal> {
        let mut stack = Vec::new();
        self.interpolate(value, referenced_by, &mut stack)
    }

    fn resolve_named(
        &mut self,
        name: &str,
        referenced_by: Option<&str>,
        stack: &mut Vec<String>,
    ) -> Result<Literal> {
        if let Some(value) = self.resolved.get(name) {
            return Ok(value.clone());
        }
        if let Some(start) = stack.iter().position(|seen| seen == name) {
            let mut chain = stack[start..].to_vec();
            chain.push(name.to_string());
            return Err(Error::CircularParameter { chain });
        }
        let raw = self
            .bag
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unresolved_parameter(name, referenced_by.map(str::to_string)))?;
        if self.bag.is_frozen() {
            return Ok(raw);
        }

        stack.push(name.to_string());
        let value = self.interpolate(&raw, Some(name), stack)?;
        stack.pop();

        self.resolved.insert(name.to_string(), value.clone());
        Ok(value)
    }

    fn interpolate(
        &mut self,
        value: &Literal,
        origin: Option<&str>,
        stack: &mut Vec<String>,
    ) -> Result<Literal> {
        let Literal::Str(text) = value else {
            return Ok(value.clone());
        };
        if let Some(name) = whole_placeholder(text) {
            return self.resolve_named(name, origin, stack);
        }
        if !text.contains(PARAMETER_DELIMITER) {
            return Ok(value.clone());
        }

        let mut output = String::with_capacity(text.len());
        let mut rest = text.as_str();
        while let Some(start) = rest.find(PARAMETER_DELIMITER) {
            output.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            if let Some(escaped) = after.strip_prefix(PARAMETER_DELIMITER) {
                output.push(PARAMETER_DELIMITER);
                rest = escaped;
                continue;
            }
            match after.find(PARAMETER_DELIMITER) {
                Some(end) if is_parameter_name(&after[..end]) => {
                    let resolved = self.resolve_named(&after[..end], origin, stack)?;
                    output.push_str(&resolved.to_interpolated());
                    rest = &after[end + 1..];
                }
                _ => {
                    output.push(PARAMETER_DELIMITER);
                    rest = after;
                }
            }
        }
        output.push_str(rest);
        Ok(Literal::Str(output))
    }
}

/// `Some(name)` when `text` is exactly `%name%`
pub fn whole_placeholder(text: &str) -> Option<&str> {
    let name = text
        .strip_prefix(PARAMETER_DELIMITER)?
        .strip_suffix(PARAMETER_DELIMITER)?;
    is_parameter_name(name).then_some(name)
}

fn is_parameter_name(candidate: &str) -> bool {
    !candidate.is_empty()
        && !candidate
            .chars()
            .any(|c| c == PARAMETER_DELIMITER || c.is_whitespace())
}
