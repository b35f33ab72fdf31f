use bold2qiime::domain::BarcodeRecord;
use bold2qiime::taxonomy::{Classifier, KingdomTable};

fn record(phylum: &str) -> BarcodeRecord {
    BarcodeRecord {
        sampleid: "S1".to_string(),
        nucleotides: "ACGT".to_string(),
        bin_uri: "BOLD:AAA".to_string(),
        phylum_name: phylum.to_string(),
        class_name: "Mammalia".to_string(),
        order_name: "Primates".to_string(),
        family_name: "Hominidae".to_string(),
        genus_name: "Homo".to_string(),
        species_name: String::new(),
    }
}

#[test]
fn chordata_is_animalia() {
    let reference = KingdomTable::default();
    let classifier = Classifier::new(&reference, None);
    assert_eq!(classifier.kingdom_for(&record("Chordata")), "Animalia");
}

#[test]
fn microsporidia_is_ambiguous() {
    let reference = KingdomTable::default();
    let classifier = Classifier::new(&reference, None);
    assert_eq!(classifier.kingdom_for(&record("Microsporidia")), "");
}

#[test]
fn unrecognized_and_missing_phyla_infer_nothing() {
    let reference = KingdomTable::default();
    let classifier = Classifier::new(&reference, None);
    assert_eq!(classifier.kingdom_for(&record("Chordatta")), "");
    assert_eq!(classifier.kingdom_for(&record("")), "");
}

#[test]
fn override_applies_to_every_record() {
    let reference = KingdomTable::default();
    let classifier = Classifier::new(&reference, Some("Metazoa".to_string()));
    for phylum in ["Chordata", "Microsporidia", "", "Ascomycota"] {
        assert_eq!(classifier.kingdom_for(&record(phylum)), "Metazoa");
    }
}

#[test]
fn inference_returns_a_known_kingdom_or_nothing() {
    let reference = KingdomTable::default();
    let known: Vec<_> = reference.kingdom_names().collect();
    for phylum in ["Chordata", "Ascomycota", "Microsporidia", "Tracheophyta", "x", ""] {
        let kingdom = reference.infer(phylum);
        assert!(kingdom.is_empty() || known.contains(&kingdom), "{phylum}");
    }
}

#[test]
fn lineage_has_seven_ordered_segments() {
    let reference = KingdomTable::default();
    let classifier = Classifier::new(&reference, None);
    for phylum in ["Chordata", "Microsporidia", ""] {
        let lineage = classifier.lineage(&record(phylum)).to_string();
        assert_eq!(lineage.matches(';').count(), 6);
        let prefixes: Vec<_> = lineage
            .split("; ")
            .map(|segment| &segment[..3])
            .collect();
        assert_eq!(prefixes, ["k__", "p__", "c__", "o__", "f__", "g__", "s__"]);
    }
}

#[test]
fn lineage_renders_empty_ranks_as_bare_prefix() {
    let reference = KingdomTable::default();
    let classifier = Classifier::new(&reference, None);
    assert_eq!(
        classifier.lineage(&record("Chordata")).to_string(),
        "k__Animalia; p__Chordata; c__Mammalia; o__Primates; f__Hominidae; g__Homo; s__"
    );
}
