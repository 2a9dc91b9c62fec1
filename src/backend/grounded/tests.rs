//! Tests for grounded operations.

use super::*;

#[test]
fn test_add_op() {
    let result = AddOp.execute(&[Value::Long(2), Value::Long(3)]).unwrap();
    assert_eq!(result, Value::Long(5));
}

#[test]
fn test_add_float() {
    let result = AddOp
        .execute(&[Value::Float(2.5), Value::Long(3)])
        .unwrap();
    if let Value::Float(f) = &result {
        assert!((f - 5.5).abs() < f64::EPSILON);
    } else {
        panic!("Expected Float");
    }
}

#[test]
fn test_add_overflow() {
    let result = AddOp.execute(&[Value::Long(i64::MAX), Value::Long(1)]);
    assert!(matches!(result, Err(ExecError::Arithmetic(_))));
}

#[test]
fn test_mul_type_mismatch() {
    match MulOp.execute(&[Value::Long(2), Value::from("x")]) {
        Err(ExecError::Runtime(msg)) => assert!(msg.contains("String")),
        other => panic!("Expected Runtime error, got {:?}", other),
    }
}

#[test]
fn test_arity() {
    let result = SubOp.execute(&[Value::Long(1)]);
    match result {
        Err(ExecError::IncorrectArgument(msg)) => {
            assert!(msg.contains("requires 2 arguments"));
        }
        other => panic!("Expected IncorrectArgument, got {:?}", other),
    }
}

#[test]
fn test_division_by_zero() {
    let result = DivOp.execute(&[Value::Long(10), Value::Long(0)]);
    assert!(matches!(result, Err(ExecError::Arithmetic(_))));

    let result = DivOp.execute(&[Value::Long(7), Value::Long(2)]).unwrap();
    assert_eq!(result, Value::Long(3));
}

#[test]
fn test_comparison_less() {
    let result = LessOp.execute(&[Value::Long(2), Value::Long(3)]).unwrap();
    assert_eq!(result, Value::Bool(true));

    let result = GreaterEqOp
        .execute(&[Value::Float(2.0), Value::Long(3)])
        .unwrap();
    assert_eq!(result, Value::Bool(false));
}

#[test]
fn test_comparison_incomparable() {
    let result = LessOp.execute(&[Value::Long(2), Value::from("3")]);
    assert!(matches!(result, Err(ExecError::Runtime(_))));
}

#[test]
fn test_equality_mixed_numbers() {
    let result = EqualOp
        .execute(&[Value::Long(2), Value::Float(2.0)])
        .unwrap();
    assert_eq!(result, Value::Bool(true));

    let result = NotEqualOp
        .execute(&[Value::list([1, 2]), Value::list([1, 2])])
        .unwrap();
    assert_eq!(result, Value::Bool(false));
}

#[test]
fn test_concat_lists_in_order() {
    let result = ConcatOp
        .execute(&[Value::list([1]), Value::Nil, Value::list([2, 3])])
        .unwrap();
    assert_eq!(result, Value::list([1, 2, 3]));

    assert_eq!(ConcatOp.execute(&[]).unwrap(), Value::empty_list());
}

#[test]
fn test_concat_strings() {
    let result = ConcatOp
        .execute(&[Value::from("ab"), Value::from("cd")])
        .unwrap();
    assert_eq!(result, Value::from("abcd"));
}

#[test]
fn test_concat_rejects_mixed() {
    let result = ConcatOp.execute(&[Value::list([1]), Value::Long(2)]);
    assert!(matches!(result, Err(ExecError::Runtime(_))));
}

#[test]
fn test_index() {
    let list = Value::list([10, 20, 30]);
    assert_eq!(
        IndexOp.execute(&[list.clone(), Value::Long(1)]).unwrap(),
        Value::Long(20)
    );
    assert!(matches!(
        IndexOp.execute(&[list.clone(), Value::Long(3)]),
        Err(ExecError::IncorrectArgument(_))
    ));
    assert!(matches!(
        IndexOp.execute(&[list, Value::Long(-1)]),
        Err(ExecError::IncorrectArgument(_))
    ));
    assert_eq!(
        IndexOp.execute(&[Value::from("héllo"), Value::Long(1)]).unwrap(),
        Value::from("é")
    );
}

#[test]
fn test_compare_lists_lexicographically() {
    use std::cmp::Ordering;
    let ord = compare_values(&Value::list([1, 2]), &Value::list([1, 3])).unwrap();
    assert_eq!(ord, Ordering::Less);
    let ord = compare_values(&Value::list([1, 2]), &Value::list([1])).unwrap();
    assert_eq!(ord, Ordering::Greater);
}
