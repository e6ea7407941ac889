//! Candidate dictionary construction from CC-CEDICT and unigram counts.
//!
//! Admission rules: entries of four or fewer Han characters whose reading is
//! a well-formed sequence of tone-numbered pinyin syllables. Every
//! reading-prefix/character-prefix pair of an admitted word is added as well,
//! so compound readings match while they are still being typed. Candidates
//! under one reading are ordered by descending unigram frequency, and a
//! single-character candidate whose tone is not the character's most attested
//! tone for that reading body is flagged rare.

use anyhow::{Context, Result};
use fst::MapBuilder;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tonepin_core::DictEntry;
use unicode_normalization::UnicodeNormalization;

/// One admitted CC-CEDICT entry: simplified text plus its normalized
/// tone-numbered reading.
#[derive(Debug, Clone)]
pub struct CedictEntry {
    pub simplified: String,
    pub reading: String,
}

/// Load Google-ngram style unigram counts: `word_POS<TAB>year,count,volumes...`
/// summed over all years, POS tags discarded.
pub fn load_unigrams(path: &Path) -> Result<HashMap<String, u64>> {
    let file =
        File::open(path).with_context(|| format!("open unigrams {}", path.display()))?;
    let mut counts: HashMap<String, u64> = HashMap::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let mut fields = line.split('\t');
        let head = match fields.next() {
            Some(h) if !h.is_empty() => h,
            _ => continue,
        };
        let word = head.split('_').next().unwrap_or(head);
        let mut total = 0u64;
        for entry in fields {
            let mut parts = entry.split(',');
            let _year = parts.next();
            if let Some(count) = parts.next().and_then(|c| c.parse::<u64>().ok()) {
                total += count;
            }
        }
        if total > 0 {
            *counts.entry(word.to_string()).or_default() += total;
        }
    }
    Ok(counts)
}

/// Parse a CC-CEDICT file: `TRADITIONAL SIMPLIFIED [reading] /defs/` lines,
/// comments skipped. Readings are NFC-normalized, lowercased, with the
/// CEDICT `u:` spelling mapped to `v`.
pub fn load_cedict(path: &Path) -> Result<Vec<CedictEntry>> {
    let file = File::open(path).with_context(|| format!("open cedict {}", path.display()))?;
    let line_re = Regex::new(r"^(\S+) (\S+) \[(.*?)\]").expect("static regex");
    let mut entries = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(caps) = line_re.captures(&line) {
            let simplified = caps[2].to_string();
            let reading: String = caps[3].nfc().collect::<String>().to_lowercase();
            let reading = reading.replace("u:", "v");
            entries.push(CedictEntry {
                simplified,
                reading,
            });
        }
    }
    Ok(entries)
}

fn is_han(c: char) -> bool {
    // Rough CJK check, everything from the Extension A block upward
    c as u32 >= 0x3400
}

/// Build the reading-key → candidates table.
pub fn candidate_table(
    entries: &[CedictEntry],
    unigrams: &HashMap<String, u64>,
) -> BTreeMap<String, Vec<DictEntry>> {
    let well_formed = Regex::new(r"^(?:[a-z]+[1-5] ?)+$").expect("static regex");

    // Tone attestation per (character, toneless body): how many admitted
    // entries use that character with that exact tone-numbered syllable
    let mut tone_counts: HashMap<(char, String), HashMap<String, u64>> = HashMap::new();
    let mut admitted: Vec<(&CedictEntry, Vec<char>, Vec<&str>)> = Vec::new();

    for entry in entries {
        let chars: Vec<char> = entry.simplified.chars().collect();
        let is_short = chars.len() <= 4;
        let is_cjk = chars.iter().all(|&c| is_han(c));
        if !is_short || !is_cjk || !well_formed.is_match(&entry.reading) {
            continue;
        }
        let segments: Vec<&str> = entry.reading.split(' ').collect();
        if segments.len() != chars.len() {
            continue;
        }
        for (&c, &seg) in chars.iter().zip(&segments) {
            let body = seg[..seg.len() - 1].to_string();
            *tone_counts
                .entry((c, body))
                .or_default()
                .entry(seg.to_string())
                .or_default() += 1;
        }
        admitted.push((entry, chars, segments));
    }

    let is_rare = |c: char, seg: &str| {
        let body = &seg[..seg.len() - 1];
        let Some(counts) = tone_counts.get(&(c, body.to_string())) else {
            return false;
        };
        let this = counts.get(seg).copied().unwrap_or(0);
        counts.values().any(|&other| other > this)
    };

    // Gather every prefix of every admitted entry, de-duplicated per key
    let mut table: BTreeMap<String, Vec<DictEntry>> = BTreeMap::new();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    for (_entry, chars, segments) in &admitted {
        for i in 1..=chars.len() {
            let key = segments[..i].join(" ");
            let text: String = chars[..i].iter().collect();
            if !seen.insert((key.clone(), text.clone())) {
                continue;
            }
            let rare_tone = i == 1 && is_rare(chars[0], segments[0]);
            table
                .entry(key)
                .or_default()
                .push(DictEntry { text, rare_tone });
        }
    }

    // Most frequent first; the sort is stable, so ties keep source order
    for candidates in table.values_mut() {
        candidates.sort_by_key(|e| {
            std::cmp::Reverse(unigrams.get(&e.text).copied().unwrap_or(0))
        });
    }

    table
}

/// Write the runtime artifacts: `dict.fst` keyed by reading, `dict.bincode`
/// holding the candidate payload vector in key order.
pub fn write_artifacts(table: &BTreeMap<String, Vec<DictEntry>>, out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create {}", out_dir.display()))?;

    // BTreeMap iterates in lexicographic key order, which is exactly what
    // the fst builder requires
    let mut builder = MapBuilder::new(Vec::new())?;
    let mut payloads: Vec<&Vec<DictEntry>> = Vec::with_capacity(table.len());
    for (i, (key, candidates)) in table.iter().enumerate() {
        builder.insert(key, i as u64)?;
        payloads.push(candidates);
    }
    let fst_bytes = builder.into_inner()?;

    let fst_path = out_dir.join("dict.fst");
    File::create(&fst_path)
        .with_context(|| format!("create {}", fst_path.display()))?
        .write_all(&fst_bytes)?;

    let bincode_path = out_dir.join("dict.bincode");
    let serialized = bincode::serialize(&payloads)?;
    File::create(&bincode_path)
        .with_context(|| format!("create {}", bincode_path.display()))?
        .write_all(&serialized)?;

    Ok(())
}

/// Write the JSON interchange form used by browser hosts.
pub fn write_json(table: &BTreeMap<String, Vec<DictEntry>>, path: &Path) -> Result<()> {
    let json = serde_json::to_string(table)?;
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(simplified: &str, reading: &str) -> CedictEntry {
        CedictEntry {
            simplified: simplified.to_string(),
            reading: reading.to_string(),
        }
    }

    #[test]
    fn subword_prefixes_are_added() {
        let entries = vec![entry("东西南", "dong1 xi1 nan2")];
        let table = candidate_table(&entries, &HashMap::new());
        assert_eq!(table["dong1"][0].text, "东");
        assert_eq!(table["dong1 xi1"][0].text, "东西");
        assert_eq!(table["dong1 xi1 nan2"][0].text, "东西南");
    }

    #[test]
    fn malformed_and_long_entries_are_dropped() {
        let entries = vec![
            entry("星期天", "xing1 qi1 tian1"),
            // Reading without tone numbers
            entry("乱", "luan"),
            // First syllable lacks its tone digit
            entry("Ｑ版", "q ban3"),
            // Five characters
            entry("中华人民共和", "zhong1 hua2 ren2 min2 gong4"),
        ];
        let table = candidate_table(&entries, &HashMap::new());
        assert!(table.contains_key("xing1 qi1 tian1"));
        assert_eq!(table.len(), 3); // the three prefixes of 星期天
    }

    #[test]
    fn candidates_are_frequency_ordered() {
        let entries = vec![entry("步", "bu4"), entry("不", "bu4")];
        let mut unigrams = HashMap::new();
        unigrams.insert("不".to_string(), 1000u64);
        unigrams.insert("步".to_string(), 10u64);
        let table = candidate_table(&entries, &unigrams);
        let texts: Vec<&str> = table["bu4"].iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["不", "步"]);
    }

    #[test]
    fn minority_tone_is_flagged_rare() {
        // 得 is attested twice as de2 (standalone and in 得到) and once as
        // de5; the de5 reading is the minority one
        let entries = vec![
            entry("得", "de2"),
            entry("得到", "de2 dao4"),
            entry("得", "de5"),
        ];
        let table = candidate_table(&entries, &HashMap::new());
        let de2 = table["de2"].iter().find(|e| e.text == "得").unwrap();
        let de5 = table["de5"].iter().find(|e| e.text == "得").unwrap();
        assert!(!de2.rare_tone);
        assert!(de5.rare_tone);
    }

    #[test]
    fn duplicate_prefixes_collapse() {
        let entries = vec![entry("东西", "dong1 xi1"), entry("东面", "dong1 mian4")];
        let table = candidate_table(&entries, &HashMap::new());
        let dong: Vec<&str> = table["dong1"].iter().map(|e| e.text.as_str()).collect();
        assert_eq!(dong, vec!["东"]);
    }
}
