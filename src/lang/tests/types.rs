use super::type_ok;
use crate::lang::Type;

#[test]
fn base_types() {
    assert_eq!(type_ok("sample"), Type::SAMPLE);
    assert_eq!(type_ok("index"), Type::INDEX);
    assert_eq!(type_ok("unit"), Type::UNIT);
}

#[test]
fn function_is_right_associative() {
    assert_eq!(
        type_ok("sample -> index -> unit"),
        Type::function(Type::SAMPLE, Type::function(Type::INDEX, Type::UNIT))
    );
}

#[test]
fn stream_binds_tightest() {
    assert_eq!(
        type_ok("~sample * index"),
        Type::product(Type::stream(Type::SAMPLE), Type::INDEX)
    );
}

#[test]
fn product_binds_tighter_than_sum() {
    assert_eq!(
        type_ok("sample + index * unit"),
        Type::sum(Type::SAMPLE, Type::product(Type::INDEX, Type::UNIT))
    );
    assert_eq!(
        type_ok("sample * index + unit"),
        Type::sum(Type::product(Type::SAMPLE, Type::INDEX), Type::UNIT)
    );
}

#[test]
fn sum_binds_tighter_than_function() {
    assert_eq!(
        type_ok("sample + index -> unit"),
        Type::function(Type::sum(Type::SAMPLE, Type::INDEX), Type::UNIT)
    );
}

#[test]
fn product_and_sum_are_right_associative() {
    assert_eq!(
        type_ok("sample * index * unit"),
        Type::product(Type::SAMPLE, Type::product(Type::INDEX, Type::UNIT))
    );
    assert_eq!(
        type_ok("sample + index + unit"),
        Type::sum(Type::SAMPLE, Type::sum(Type::INDEX, Type::UNIT))
    );
}

#[test]
fn parentheses_override() {
    assert_eq!(
        type_ok("(sample -> sample) -> ~(sample * sample)"),
        Type::function(
            Type::function(Type::SAMPLE, Type::SAMPLE),
            Type::stream(Type::product(Type::SAMPLE, Type::SAMPLE))
        )
    );
}

#[test]
fn nested_streams() {
    assert_eq!(
        type_ok("~~sample"),
        Type::stream(Type::stream(Type::SAMPLE))
    );
}
