use std::collections::BTreeMap;
use std::fmt;

use crate::expression::{LinearExpression, Term};
use crate::problem::{Constraint, Direction, ModelError, Objective, Problem, Relation, SignRestriction};

/// Matrix layout of a problem.
///
/// Codes: `min_max` is 1 for max and -1 for min; `eqin` is -1 for `<=`, 0 for
/// `=` and 1 for `>=`; `natural_constraints` is 1 for `>= 0`, -1 for `<= 0`
/// and 0 for free.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct DenseForm {
    #[cfg_attr(feature = "serde", serde(rename = "MinMax"))]
    pub min_max: i64,
    pub c: Vec<f64>,
    #[cfg_attr(feature = "serde", serde(rename = "A"))]
    pub a: Vec<Vec<f64>>,
    #[cfg_attr(feature = "serde", serde(rename = "Eqin"))]
    pub eqin: Vec<i64>,
    pub b: Vec<f64>,
    #[cfg_attr(feature = "serde", serde(rename = "naturalConstraints"))]
    pub natural_constraints: Vec<i64>,
}

impl From<&Problem> for DenseForm {
    fn from(problem: &Problem) -> Self {
        let n = problem.num_variables();
        let row = |expression: &LinearExpression| -> Vec<f64> {
            (1..=n).map(|v| expression.coefficient(v)).collect()
        };

        Self {
            min_max: match problem.direction() {
                Direction::Max => 1,
                Direction::Min => -1,
            },
            c: row(&problem.objective().expression),
            a: problem.constraints().iter().map(|c| row(&c.expression)).collect(),
            eqin: problem
                .constraints()
                .iter()
                .map(|c| match c.relation {
                    Relation::Le => -1,
                    Relation::Eq => 0,
                    Relation::Ge => 1,
                })
                .collect(),
            b: problem.constraints().iter().map(|c| c.rhs).collect(),
            natural_constraints: (1..=n)
                .map(|v| match problem.restriction(v) {
                    SignRestriction::NonNegative => 1,
                    SignRestriction::Free => 0,
                    SignRestriction::NonPositive => -1,
                })
                .collect(),
        }
    }
}

impl TryFrom<DenseForm> for Problem {
    type Error = ModelError;

    fn try_from(dense: DenseForm) -> Result<Self, Self::Error> {
        let n = dense.c.len();
        let m = dense.a.len();
        if dense.b.len() != m || dense.eqin.len() != m {
            return Err(ModelError::DenseShape(format!(
                "{} rows in A but {} entries in b and {} in Eqin",
                m,
                dense.b.len(),
                dense.eqin.len()
            )));
        }
        if dense.natural_constraints.len() != n {
            return Err(ModelError::DenseShape(format!(
                "{} entries in c but {} natural constraints",
                n,
                dense.natural_constraints.len()
            )));
        }
        if let Some(row) = dense.a.iter().position(|row| row.len() != n) {
            return Err(ModelError::DenseShape(format!(
                "row {} of A has {} entries, expected {}",
                row + 1,
                dense.a[row].len(),
                n
            )));
        }

        let direction = match dense.min_max {
            1 => Direction::Max,
            -1 => Direction::Min,
            code => return Err(ModelError::DenseCode { field: "MinMax", code }),
        };

        let dense_row = |values: &[f64]| -> LinearExpression {
            values
                .iter()
                .enumerate()
                .map(|(j, &coefficient)| Term::new(coefficient, j + 1))
                .collect()
        };

        let mut constraints = Vec::with_capacity(m);
        for ((values, &code), &rhs) in dense.a.iter().zip(&dense.eqin).zip(&dense.b) {
            let relation = match code {
                -1 => Relation::Le,
                0 => Relation::Eq,
                1 => Relation::Ge,
                code => return Err(ModelError::DenseCode { field: "Eqin", code }),
            };
            constraints.push(Constraint::new(dense_row(values), relation, rhs));
        }

        let mut restrictions = BTreeMap::new();
        for (j, &code) in dense.natural_constraints.iter().enumerate() {
            let restriction = match code {
                1 => SignRestriction::NonNegative,
                0 => SignRestriction::Free,
                -1 => SignRestriction::NonPositive,
                code => {
                    return Err(ModelError::DenseCode { field: "naturalConstraints", code });
                }
            };
            restrictions.insert(j + 1, restriction);
        }

        Problem::new(Objective::new(direction, dense_row(&dense.c)), constraints, restrictions)
    }
}

fn write_vector<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    write!(f, "[")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", value)?;
    }
    write!(f, "]")
}

impl fmt::Display for DenseForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MinMax = {}", self.min_max)?;
        writeln!(f)?;
        write!(f, "c =\n")?;
        write_vector(f, &self.c)?;
        writeln!(f)?;
        writeln!(f)?;
        writeln!(f, "A =")?;
        for row in &self.a {
            write_vector(f, row)?;
            writeln!(f)?;
        }
        writeln!(f)?;
        writeln!(f, "Eqin =")?;
        for code in &self.eqin {
            writeln!(f, "[{}]", code)?;
        }
        writeln!(f)?;
        writeln!(f, "b =")?;
        for value in &self.b {
            writeln!(f, "[{}]", value)?;
        }
        writeln!(f)?;
        write!(f, "naturalConstraints =\n")?;
        write_vector(f, &self.natural_constraints)?;
        writeln!(f)
    }
}
