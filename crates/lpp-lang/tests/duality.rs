use lpp_lang::{parse, ParseError};
use lpp_model::{DenseForm, Direction, Problem, Relation, SignRestriction};

const PROBLEMS: &[&str] = &[
    "max 3x1 + 5x2 s.t. x1 + 2x2 <= 4 3x1 + 2x2 <= 6 with x1 >= 0 x2 free end",
    "min 2x1 - x3\n\
     subject to\n\
     x1 + x2 - x3 = 1\n\
     -x1 + 4x3 >= -2.5\n\
     x2 <= 7\n\
     with x1 free x3 <= 0\n\
     end",
    "Minimise cost: 0.25x1 + 1e-3x2 + 4x5 st x1 + x5 >= 1 x2 + x5 =< 3 end",
    "max -x2 s.t. x2 - x4 <= 0 x4 <= 1 with x1, x3 free end",
];

#[test]
fn test_double_duality() {
    for source in PROBLEMS {
        let problem = parse(source).unwrap();
        assert_eq!(problem.dual().dual(), problem, "double dual of {source:?}");
    }
}

#[test]
fn test_dual_dimensions() {
    for source in PROBLEMS {
        let problem = parse(source).unwrap();
        let dual = problem.dual();
        assert_eq!(dual.num_variables(), problem.num_constraints());
        assert_eq!(dual.num_constraints(), problem.num_variables());
        assert_eq!(dual.direction(), problem.direction().flip());
    }
}

#[test]
fn test_text_round_trip() {
    for source in PROBLEMS {
        let problem = parse(source).unwrap();
        let text = problem.to_string();
        assert_eq!(parse(&text).unwrap(), problem, "round trip of {text:?}");

        let dual = problem.dual();
        // gap variables and zero right-hand sides have no text form
        let printable = !dual.objective().expression.is_empty()
            && dual.constraints().iter().all(|c| !c.expression.is_empty());
        if printable {
            assert_eq!(parse(&dual.to_string()).unwrap(), dual);
        }
    }
}

#[test]
fn test_dense_round_trip() {
    for source in PROBLEMS {
        let problem = parse(source).unwrap();
        let dense = DenseForm::from(&problem);
        assert_eq!(Problem::try_from(dense).unwrap(), problem);
    }
}

#[test]
fn test_invariance() {
    let reference = parse("max 3x1 + 5x2 s.t. x1 + 2x2 <= 4 end").unwrap();
    let variants = [
        "max 3x1+5x2 s.t. x1+2x2<=4 end",
        "MAX 5x2 + 3x1\nS.T.\n2 x2 + x1 <= 4\nEND",
        "  maximize   3 * x1 + 5 * x2   subject to   x1 + 2x2 - 4 <= 0  end  ",
        "max 3x1 + 5x2 s.t. x1 <= 4 - 2x2 end",
        "max x1 + 2x1 + 5x2 s.t. x1 + x2 + x2 <= 4 end",
    ];
    for source in variants {
        assert_eq!(parse(source).unwrap(), reference, "{source:?}");
    }
}

#[test]
fn test_unused_declared_variable() {
    let problem = parse("max x1 s.t. x1 <= 1 with x3 free end").unwrap();
    assert_eq!(problem.num_variables(), 3);
    assert_eq!(problem.restriction(3), SignRestriction::Free);

    let dual = problem.dual();
    assert_eq!(dual.num_constraints(), 3);
    assert!(dual.constraints()[2].expression.is_empty());
    assert_eq!(dual.constraints()[2].relation, Relation::Eq);
}

#[test]
fn test_minimise_scenario() {
    let problem = parse(PROBLEMS[1]).unwrap();
    assert_eq!(problem.direction(), Direction::Min);
    assert_eq!(problem.num_variables(), 3);
    assert_eq!(problem.constraints()[1].rhs, -2.5);

    let dual = problem.dual();
    assert_eq!(dual.direction(), Direction::Max);
    // min: = row gives a free dual variable, >= row a non-negative one, <= row a non-positive one
    assert_eq!(dual.restriction(1), SignRestriction::Free);
    assert_eq!(dual.restriction(2), SignRestriction::NonNegative);
    assert_eq!(dual.restriction(3), SignRestriction::NonPositive);
    // x1 free gives =, x2 >= 0 gives <=, x3 <= 0 gives >=
    assert_eq!(dual.constraints()[0].relation, Relation::Eq);
    assert_eq!(dual.constraints()[1].relation, Relation::Le);
    assert_eq!(dual.constraints()[2].relation, Relation::Ge);
}

#[test]
fn test_errors_are_all_or_nothing() {
    assert_eq!(parse("max x1 s.t. x1 <= 1"), Err(ParseError::MissingEnd));
    assert!(matches!(
        parse("max x1 s.t. x1 <= 1 x2 x3 >= 1 end"),
        Err(ParseError::Syntax { .. })
    ));
}
