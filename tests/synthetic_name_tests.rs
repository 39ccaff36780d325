//! Synthetic factory names under concurrent generation

use indylink::common::compilation_context::GeneratorContext;
use std::collections::HashSet;

#[test]
fn test_names_stay_unique_across_threads() {
    let generator = GeneratorContext::new("p/Shared");

    let names: Vec<String> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|worker| {
                let context = generator.method_context(Some(&format!("m{}", worker % 2)));
                scope.spawn(move || (0..50).map(|_| context.next_constructor_reference_name()).collect::<Vec<_>>())
            })
            .collect();
        workers.into_iter().flat_map(|w| w.join().expect("worker panicked")).collect()
    });

    let indices: HashSet<u32> = names
        .iter()
        .map(|n| n.rsplit('$').next().and_then(|i| i.parse().ok()).expect("numeric suffix"))
        .collect();
    assert_eq!(names.len(), 400);
    assert_eq!(indices.len(), 400);
    assert_eq!(indices.iter().max(), Some(&399));
    assert_eq!(generator.synthetic_count(), 400);
}

#[test]
fn test_each_enclosing_type_counts_from_zero() {
    let first = GeneratorContext::new("p/A");
    let second = GeneratorContext::new("p/B");

    let a = first.method_context(Some("run"));
    let b = second.method_context(Some("run"));
    assert_eq!(a.next_constructor_reference_name(), "ctorRef$run$0");
    assert_eq!(b.next_constructor_reference_name(), "ctorRef$run$0");
    assert_eq!(a.next_constructor_reference_name(), "ctorRef$run$1");
}

#[test]
fn test_initializer_names() {
    let generator = GeneratorContext::new("p/A");
    assert_eq!(generator.method_context(Some("<clinit>")).next_constructor_reference_name(), "ctorRef$clinit$0");
    assert_eq!(generator.method_context(None).next_constructor_reference_name(), "ctorRef$1");
}
