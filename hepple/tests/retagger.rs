use std::sync::Arc;

use libhepple::{HeppleConfig, HeppleTagger, Lexicon, MemoryLexicon, TaggedWord};

fn lexicon() -> Arc<dyn Lexicon> {
    let mut lx = MemoryLexicon::new();
    for (word, tag, n) in [
        ("the", "at1", 1000),
        ("dog", "n1", 80),
        ("dog", "vvb", 5),
        ("dogs", "n2", 40),
        ("dogs", "vvz", 10),
        ("them", "pno32", 50),
        ("she", "pns31", 90),
        ("can", "vm", 100),
        ("can", "n1", 20),
        ("a", "at1", 800),
        ("tin", "n1", 30),
        ("has", "vhz", 100),
        ("opened", "vvd", 70),
        ("opened", "vvn", 30),
    ] {
        lx.insert(word, tag, n);
    }
    Arc::new(lx)
}

const RULES: &str = "\
n1 vvb PREVTAG vm

vm n1 PREVTAG at1
n2 vvz NEXTTAG pno32
vvd vvn PREV1OR2WD has
";

fn tagger() -> HeppleTagger {
    HeppleTagger::with_rules(lexicon(), HeppleConfig::default(), RULES).unwrap()
}

fn tags(words: &[TaggedWord]) -> Vec<&str> {
    words.iter().map(|w| w.tag.as_str()).collect()
}

#[test]
fn output_matches_input_length_and_order() {
    let t = tagger();
    for sentence in [
        vec![],
        vec!["dog"],
        vec!["the", "dog"],
        vec!["she", "can", "dog", "them", "the", "dog", "has", "opened", "a", "tin"],
    ] {
        let out = t.tag_sentence(&sentence);
        let spellings: Vec<&str> = out.words.iter().map(|w| w.spelling.as_str()).collect();
        assert_eq!(spellings, sentence);
    }
}

#[test]
fn rules_correct_in_context() {
    let t = tagger();
    assert_eq!(t.rule_count(), 4);

    let out = t.tag_sentence(&["she", "can", "dog", "them"]);
    assert_eq!(tags(&out.words), vec!["pns31", "vm", "vvb", "pno32"]);

    let out = t.tag_sentence(&["a", "can"]);
    assert_eq!(tags(&out.words), vec!["at1", "n1"]);

    // slot 0 is outside PREV1OR2WD's reach
    let out = t.tag_sentence(&["has", "not", "yet", "opened"]);
    assert_eq!(out.words[3].tag, "vvd");
    let out = t.tag_sentence(&["she", "has", "opened", "it"]);
    assert_eq!(out.words[2].tag, "vvn");
}

#[test]
fn shared_tagger_across_threads() {
    let t = tagger();
    let sentences: Vec<Vec<&str>> = (0..16)
        .map(|i| {
            if i % 2 == 0 {
                vec!["she", "can", "dog", "them"]
            } else {
                vec!["the", "dogs", "them"]
            }
        })
        .collect();

    std::thread::scope(|s| {
        let handles: Vec<_> = sentences
            .iter()
            .map(|sentence| {
                let t = &t;
                s.spawn(move || t.tag_sentence(sentence))
            })
            .collect();
        for (i, h) in handles.into_iter().enumerate() {
            let out = h.join().unwrap();
            if i % 2 == 0 {
                assert_eq!(tags(&out.words), vec!["pns31", "vm", "vvb", "pno32"]);
            } else {
                assert_eq!(tags(&out.words), vec!["at1", "vvz", "pno32"]);
            }
        }
    });
    assert_eq!(t.rule_corrections(), 16);
}

#[test]
fn batch_tagging_matches_single_calls() {
    let t = tagger();
    let batch = vec![vec!["a", "can"], vec!["she", "can", "dog", "them"]];
    let out = t.tag_sentences(&batch);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0], t.tag_sentence(&batch[0]));
    assert_eq!(out[1], t.tag_sentence(&batch[1]));
}

#[test]
fn rules_load_from_file() {
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("libhepple_rules_{}.txt", stamp));
    std::fs::write(&path, RULES).unwrap();
    let t = HeppleTagger::from_rules_file(lexicon(), HeppleConfig::default(), &path).unwrap();
    assert_eq!(t.rules_for("n1").len(), 1);
    assert_eq!(t.rules_for("vm").len(), 1);
    let _ = std::fs::remove_file(&path);

    let missing = HeppleTagger::from_rules_file(lexicon(), HeppleConfig::default(), &path);
    let msg = format!("{:#}", missing.unwrap_err());
    assert!(msg.contains("loading context rules"));
}
