use super::*;

fn env() -> ExprEnv {
    ExprEnv {
        x: 0.25,
        y: 0.5,
        width: 0.1,
        height: 0.2,
        param: None,
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn literals_and_arithmetic() {
    assert_eq!(evaluate("1+2*3", &env()).unwrap(), 7.0);
    assert_eq!(evaluate("(1+2)*3", &env()).unwrap(), 9.0);
    assert_eq!(evaluate("-2 + 5 % 3", &env()).unwrap(), 0.0);
    assert_eq!(evaluate("1e2", &env()).unwrap(), 100.0);
    assert_eq!(evaluate(".5", &env()).unwrap(), 0.5);
}

#[test]
fn geometry_variables() {
    assert!(approx(evaluate("x+width/2", &env()).unwrap(), 0.3));
    assert!(approx(evaluate("1+height", &env()).unwrap(), 1.2));
    assert!(approx(evaluate("y", &env()).unwrap(), 0.5));
}

#[test]
fn constants_and_functions() {
    assert!(approx(evaluate("cos(pi)", &env()).unwrap(), -1.0));
    assert!(approx(evaluate("log(e)", &env()).unwrap(), 1.0));
    assert!(approx(evaluate("2*e", &env()).unwrap(), 2.0 * std::f64::consts::E));
    assert_eq!(evaluate("max(1, 4, 2)", &env()).unwrap(), 4.0);
    assert_eq!(evaluate("min(3, -1)", &env()).unwrap(), -1.0);
    assert_eq!(evaluate("abs(-2)+sqrt(9)", &env()).unwrap(), 5.0);
}

#[test]
fn formula_parameter() {
    let f = Expression::parse("$*$ + x").unwrap();
    assert!(approx(f.eval(&env().with_param(0.5)).unwrap(), 0.5));
    assert!(f.eval(&env()).is_err());
}

#[test]
fn comparisons_and_ternary() {
    let f = Expression::parse("$ < 0.5 ? 0 : 1").unwrap();
    assert_eq!(f.eval(&env().with_param(0.2)).unwrap(), 0.0);
    assert_eq!(f.eval(&env().with_param(0.7)).unwrap(), 1.0);
    assert_eq!(evaluate("1 == 1 && !(2 < 1)", &env()).unwrap(), 1.0);
    assert_eq!(evaluate("false || 0", &env()).unwrap(), 0.0);
}

#[test]
fn errors_carry_offsets() {
    let err = Expression::parse("1 + #").unwrap_err();
    assert_eq!(err.offset, 4);
    assert!(Expression::parse("(1").is_err());
    assert!(Expression::parse("").is_err());
}
