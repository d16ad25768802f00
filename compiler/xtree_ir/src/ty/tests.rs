use super::*;

fn animal() -> Ty {
    Ty::class(ClassType::new("Animal"))
}

fn dog() -> Ty {
    Ty::class(
        ClassType::new("Dog")
            .extends(animal())
            .implements(Ty::class(ClassType::interface("Pet"))),
    )
}

#[test]
fn class_equality_is_nominal() {
    assert_eq!(animal(), Ty::class(ClassType::new("Animal")));
    assert_ne!(animal(), dog());
}

#[test]
fn subclass_is_assignable_to_base() {
    assert!(animal().is_assignable_from(&dog()));
    assert!(!dog().is_assignable_from(&animal()));
}

#[test]
fn interface_is_assignable_from_implementor() {
    let pet = Ty::class(ClassType::interface("Pet"));
    assert!(pet.is_assignable_from(&dog()));
    assert!(!pet.is_assignable_from(&animal()));
}

#[test]
fn object_accepts_everything_but_void() {
    assert!(Ty::Object.is_assignable_from(&Ty::Int));
    assert!(Ty::Object.is_assignable_from(&dog()));
    assert!(!Ty::Object.is_assignable_from(&Ty::Void));
}

#[test]
fn primitives_are_not_nullable() {
    assert!(!Ty::Int.is_nullable());
    assert!(!Ty::Bool.is_nullable());
    assert!(Ty::Str.is_nullable());
    assert!(animal().is_nullable());
}

#[test]
fn display_of_constructed_types() {
    assert_eq!(Ty::task(Ty::Str).to_string(), "Task<string>");
    assert_eq!(Ty::array(Ty::Int).to_string(), "int[]");
    assert_eq!(Ty::func(vec![Ty::Int], Ty::Bool).to_string(), "Func<int, bool>");
    assert_eq!(Ty::fragment(Ty::Int).to_string(), "Node<int>");
}
