use std::collections::BTreeMap;

/// Variable index, starting at 1.
pub type Variable = usize;

/// A single `coefficient * x{variable}` term
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    pub coefficient: f64,
    pub variable: Variable,
}

impl Term {
    pub fn new(coefficient: f64, variable: Variable) -> Self {
        Self { coefficient, variable }
    }
}

/// A linear combination of variables, keyed by variable index.
///
/// Repeated variables are summed when terms are added, and a coefficient that
/// ends up at zero is removed, so two expressions describing the same linear
/// function always compare equal regardless of how they were written.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "Vec<Term>", into = "Vec<Term>")
)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpression {
    coefficients: BTreeMap<Variable, f64>,
}

impl LinearExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `coefficient` to the coefficient of `variable`
    pub fn add_term(&mut self, variable: Variable, coefficient: f64) {
        let entry = self.coefficients.entry(variable).or_insert(0.0);
        *entry += coefficient;
        if *entry == 0.0 {
            self.coefficients.remove(&variable);
        }
    }

    /// Add every term of `other`, each scaled by `factor`
    pub fn add_scaled(&mut self, other: &LinearExpression, factor: f64) {
        for (&variable, &coefficient) in &other.coefficients {
            self.add_term(variable, coefficient * factor);
        }
    }

    pub fn coefficient(&self, variable: Variable) -> f64 {
        self.coefficients.get(&variable).copied().unwrap_or(0.0)
    }

    /// Terms in ascending variable order
    pub fn terms(&self) -> impl Iterator<Item = Term> + '_ {
        self.coefficients
            .iter()
            .map(|(&variable, &coefficient)| Term { coefficient, variable })
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.coefficients.keys().copied()
    }

    pub fn max_variable(&self) -> Option<Variable> {
        self.coefficients.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }
}

impl FromIterator<Term> for LinearExpression {
    fn from_iter<I: IntoIterator<Item = Term>>(iter: I) -> Self {
        let mut expression = LinearExpression::new();
        for term in iter {
            expression.add_term(term.variable, term.coefficient);
        }
        expression
    }
}

impl From<Vec<Term>> for LinearExpression {
    fn from(terms: Vec<Term>) -> Self {
        terms.into_iter().collect()
    }
}

impl From<LinearExpression> for Vec<Term> {
    fn from(expression: LinearExpression) -> Self {
        expression.terms().collect()
    }
}
