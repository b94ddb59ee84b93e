#![no_main]
use libfuzzer_sys::fuzz_target;
use pathmacro::{Filter, Registry, Store, Template};
use std::sync::Arc;

fuzz_target!(|data: (String, Vec<String>)| {
    let registry = Registry::new();

    let Ok(template) = Template::parse(&data.0, &registry) else {
        return;
    };

    // parsing is deterministic
    assert_eq!(Template::parse(&data.0, &registry).as_ref(), Ok(&template));
    let _ = template.route();

    let Some(filter) = Filter::new(Arc::new(template)) else {
        return;
    };

    let mut store: Store<'_> = data.1.iter().map(String::as_str).collect();
    let _ = filter.evaluate(&mut store);
});
