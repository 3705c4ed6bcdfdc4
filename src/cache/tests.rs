use super::*;
use std::sync::Arc;
use std::thread;

#[test]
fn get_on_unset_key_is_none() {
    let cache = AnswerCache::new();
    assert_eq!(cache.get("what is phishing?"), None);
}

#[test]
fn put_then_get_round_trips() {
    let cache = AnswerCache::new();
    cache.put("what is phishing?", "A deceptive email attack.".to_string());
    assert_eq!(
        cache.get("what is phishing?"),
        Some("A deceptive email attack.".to_string())
    );
}

#[test]
fn keys_are_trimmed() {
    let cache = AnswerCache::new();
    cache.put("  what is phishing?  ", "answer".to_string());
    assert_eq!(cache.get("what is phishing?"), Some("answer".to_string()));
    assert_eq!(cache.get("\twhat is phishing?\n"), Some("answer".to_string()));
}

#[test]
fn put_overwrites_existing_entry() {
    let cache = AnswerCache::new();
    cache.put("q", "first".to_string());
    cache.put("q", "second".to_string());
    assert_eq!(cache.get("q"), Some("second".to_string()));
    assert_eq!(cache.len(), 1);
}

#[test]
fn clear_drops_everything() {
    let cache = AnswerCache::new();
    cache.put("a", "1".to_string());
    cache.put("b", "2".to_string());
    cache.clear();
    assert_eq!(cache.get("a"), None);
    assert_eq!(cache.get("b"), None);
    assert!(cache.is_empty());
}

#[test]
fn concurrent_puts_all_land() {
    let cache = Arc::new(AnswerCache::new());
    let mut handles = Vec::new();

    for thread_id in 0..8 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..50 {
                let question = format!("question-{}-{}", thread_id, i);
                cache.put(&question, format!("answer-{}-{}", thread_id, i));
            }
        }));
    }
    for handle in handles {
        handle.join().expect("writer thread panicked");
    }

    assert_eq!(cache.len(), 8 * 50);
    for thread_id in 0..8 {
        for i in 0..50 {
            let question = format!("question-{}-{}", thread_id, i);
            assert_eq!(
                cache.get(&question),
                Some(format!("answer-{}-{}", thread_id, i))
            );
        }
    }
}

#[test]
fn concurrent_reads_during_writes_do_not_panic() {
    let cache = Arc::new(AnswerCache::new());
    let writer = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            for i in 0..200 {
                cache.put(&format!("q{}", i), "a".to_string());
                if i % 50 == 0 {
                    cache.clear();
                }
            }
        })
    };
    let reader = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            for i in 0..200 {
                let _ = cache.get(&format!("q{}", i));
                let _ = cache.len();
            }
        })
    };
    writer.join().expect("writer panicked");
    reader.join().expect("reader panicked");
}
