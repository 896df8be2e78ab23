use std::collections::HashSet;

use regex::Regex;

use super::cleaner::CleanedText;
use super::extractor::ExtractionResult;
use super::patterns::{
    DIRECTIONS_HEADER, DIRECTION_WORD, DRUG_WITH_STRENGTH, INLINE_DOSAGE, LONG_WORD,
    MEDICINE_SKIP, NAME_SEPARATOR, NAME_TOKEN, UNIT_WORD, WORD_DIGIT,
};
use crate::record::Medicine;

/// Minimum count of ASCII letters a medicine name must keep after sanitizing.
const MIN_NAME_LETTERS: usize = 3;

/// How many following lines are searched for directions.
const DIRECTION_LOOKAHEAD: usize = 2;

/// Extracts medicines line by line, in discovery order, without duplicates.
pub fn extract_medicines(cleaned: &CleanedText) -> ExtractionResult<Vec<Medicine>> {
    let scanner = MedicineScanner::load()?;
    let lines = cleaned.lines();
    let mut found = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        if scanner.is_label_line(line) {
            continue;
        }

        let primary = scanner.drugs_with_strength(lines, idx);
        if primary.is_empty() {
            found.extend(scanner.bare_drug(lines, idx));
        } else {
            found.extend(primary);
        }
    }

    Ok(dedup_medicines(found))
}

/// Keeps the first medicine for each (lowercased name, lowercased strength).
#[must_use]
pub fn dedup_medicines(medicines: Vec<Medicine>) -> Vec<Medicine> {
    let mut seen = HashSet::new();
    medicines
        .into_iter()
        .filter(|m| seen.insert(m.dedup_key()))
        .collect()
}

struct MedicineScanner {
    skip: &'static Regex,
    header: &'static Regex,
    drug: &'static Regex,
    direction: &'static Regex,
    unit: &'static Regex,
    digit: &'static Regex,
    long_word: &'static Regex,
    separator: &'static Regex,
    dosage: &'static Regex,
    token: &'static Regex,
}

impl MedicineScanner {
    fn load() -> ExtractionResult<Self> {
        Ok(Self {
            skip: MEDICINE_SKIP.regex()?,
            header: DIRECTIONS_HEADER.regex()?,
            drug: DRUG_WITH_STRENGTH.regex()?,
            direction: DIRECTION_WORD.regex()?,
            unit: UNIT_WORD.regex()?,
            digit: WORD_DIGIT.regex()?,
            long_word: LONG_WORD.regex()?,
            separator: NAME_SEPARATOR.regex()?,
            dosage: INLINE_DOSAGE.regex()?,
            token: NAME_TOKEN.regex()?,
        })
    }

    fn is_label_line(&self, line: &str) -> bool {
        self.skip.is_match(line) || self.header.is_match(line)
    }

    /// "Name 20 mg" style entries; a line may hold several.
    fn drugs_with_strength(&self, lines: &[String], idx: usize) -> Vec<Medicine> {
        let line = &lines[idx];
        let mut medicines = Vec::new();

        for caps in self.drug.captures_iter(line) {
            let (Some(whole), Some(name), Some(strength)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };

            let name = sanitize_name(name.as_str());
            if letter_count(&name) < MIN_NAME_LETTERS {
                continue;
            }

            let directions = self.directions(trim_separators(&line[whole.end()..]), lines, idx);
            medicines.push(
                Medicine::new(name)
                    .with_strength(strength.as_str().trim())
                    .with_directions(directions),
            );
        }

        medicines
    }

    /// A name without a recognizable strength, taken from the first token
    /// before any separator. Only considered for lines that carry a unit
    /// word, a digit or a long word.
    fn bare_drug(&self, lines: &[String], idx: usize) -> Option<Medicine> {
        let line = lines[idx].as_str();
        if !(self.unit.is_match(line) || self.digit.is_match(line) || self.long_word.is_match(line))
        {
            return None;
        }

        let (head, tail) = self
            .separator
            .find(line)
            .map_or((line, None), |m| (&line[..m.start()], Some(&line[m.end()..])));

        let candidate = self.dosage.replace_all(head, "");
        let name = self.token.captures(candidate.trim())?.get(1)?.as_str().to_string();
        if letter_count(&name) < MIN_NAME_LETTERS {
            return None;
        }

        let rest = tail.unwrap_or_else(|| line.split_once(name.as_str()).map_or("", |(_, r)| r));
        let directions = self.directions(trim_separators(rest), lines, idx);

        Some(Medicine::new(name).with_directions(directions))
    }

    /// Directions come from the rest of the line when it reads like one,
    /// otherwise from the first of the next two lines that does.
    fn directions(&self, rest: &str, lines: &[String], idx: usize) -> String {
        if self.direction.is_match(rest) {
            return rest.trim().to_string();
        }

        lines
            .iter()
            .skip(idx + 1)
            .take(DIRECTION_LOOKAHEAD)
            .find(|next| self.direction.is_match(next))
            .map(|next| next.trim().to_string())
            .unwrap_or_default()
    }
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || "-()/.' ".contains(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

fn letter_count(name: &str) -> usize {
    name.chars().filter(char::is_ascii_alphabetic).count()
}

fn trim_separators(text: &str) -> &str {
    text.trim_matches(|c: char| " ,;:-".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::cleaner::clean;

    const SAMPLE: &str = "Name; Adarta Sharapova Date: wfil/2022\nAddress: 9 tennis court, new Russia, DC\nPrednisone 20 mg\nLialda 2.4 gram\nDirections:\nPrednisone, Taper 5 mg every 3 days,\nLialda - take 2 pill everyday for 1 month\nRefill: 2\n";

    fn names(medicines: &[Medicine]) -> Vec<String> {
        medicines.iter().map(|m| m.name.to_lowercase()).collect()
    }

    #[test]
    fn test_sample_medicines() {
        let medicines = extract_medicines(&clean(SAMPLE)).unwrap();
        let names = names(&medicines);

        assert!(names.contains(&"prednisone".to_string()));
        assert!(names.contains(&"lialda".to_string()));
        assert!(!names.contains(&"name".to_string()));
        assert!(!names.contains(&"refill".to_string()));
    }

    #[test]
    fn test_strength_is_captured_whole() {
        let medicines = extract_medicines(&clean(SAMPLE)).unwrap();

        let prednisone = medicines.iter().find(|m| m.name == "Prednisone").unwrap();
        assert_eq!(prednisone.strength, "20 mg");

        let lialda = medicines
            .iter()
            .find(|m| m.name == "Lialda" && !m.strength.is_empty())
            .unwrap();
        assert_eq!(lialda.strength, "2.4 gram");
    }

    #[test]
    fn test_directions_on_same_line() {
        let medicines = extract_medicines(&clean("Amoxicillin 500 mg take one every 8 hours")).unwrap();

        assert_eq!(medicines.len(), 1);
        assert_eq!(medicines[0].name, "Amoxicillin");
        assert_eq!(medicines[0].strength, "500 mg");
        assert_eq!(medicines[0].directions, "take one every 8 hours");
    }

    #[test]
    fn test_directions_lookahead_limit() {
        let text = "Ibuprofen 200 mg\nblank note\nanother note\ntake with food";
        let medicines = extract_medicines(&clean(text)).unwrap();

        let ibuprofen = medicines.iter().find(|m| m.name == "Ibuprofen").unwrap();
        assert_eq!(ibuprofen.directions, "");

        let text = "Ibuprofen 200 mg\nblank note\ntake with food";
        let medicines = extract_medicines(&clean(text)).unwrap();
        assert_eq!(medicines[0].directions, "take with food");
    }

    #[test]
    fn test_bare_drug_with_separator() {
        let medicines =
            extract_medicines(&clean("Lialda - take 2 pill everyday for 1 month")).unwrap();

        assert_eq!(medicines.len(), 1);
        assert_eq!(medicines[0].name, "Lialda");
        assert_eq!(medicines[0].strength, "");
        assert_eq!(medicines[0].directions, "take 2 pill everyday for 1 month");
    }

    #[test]
    fn test_short_names_discarded() {
        let medicines = extract_medicines(&clean("Xy 5 mg\n12 34")).unwrap();
        assert!(medicines.is_empty());
    }

    #[test]
    fn test_deduplicated_in_discovery_order() {
        let text = "Prednisone 20 mg\nMetformin 500 mg\nPREDNISONE 20 MG\nPrednisone 10 mg";
        let medicines = extract_medicines(&clean(text)).unwrap();

        let listed: Vec<(&str, &str)> = medicines
            .iter()
            .map(|m| (m.name.as_str(), m.strength.as_str()))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("Prednisone", "20 mg"),
                ("Metformin", "500 mg"),
                ("Prednisone", "10 mg"),
            ]
        );
    }

    #[test]
    fn test_label_words_inside_drug_lines_kept() {
        let text = "Amoxicillin 500 mg take twice daily, no refills\nMetformin 850 mg once daily after Dr review";
        let medicines = extract_medicines(&clean(text)).unwrap();

        let listed: Vec<(&str, &str)> = medicines
            .iter()
            .map(|m| (m.name.as_str(), m.strength.as_str()))
            .collect();
        assert_eq!(listed, vec![("Amoxicillin", "500 mg"), ("Metformin", "850 mg")]);
        assert_eq!(medicines[0].directions, "take twice daily, no refills");
    }

    #[test]
    fn test_four_digit_strength() {
        let medicines = extract_medicines(&clean("Metformin 1000 mg daily")).unwrap();

        assert_eq!(medicines.len(), 1);
        assert_eq!(medicines[0].name, "Metformin");
        assert_eq!(medicines[0].strength, "1000 mg");
        assert_eq!(medicines[0].directions, "daily");
    }

    #[test]
    fn test_bare_drug_strips_leading_dosage() {
        let medicines = extract_medicines(&clean("20 mg Prednisone - take daily")).unwrap();

        assert_eq!(medicines.len(), 1);
        assert_eq!(medicines[0].name, "Prednisone");
        assert_eq!(medicines[0].strength, "");
        assert_eq!(medicines[0].directions, "take daily");
    }

    #[test]
    fn test_placeholder_text_has_no_medicines() {
        assert!(extract_medicines(&clean("### OCR_FAILED ###")).unwrap().is_empty());
        assert!(extract_medicines(&clean("### NO_PAGES ###")).unwrap().is_empty());
        assert!(extract_medicines(&clean("")).unwrap().is_empty());
    }
}
