//! Client-side sort and filter pipeline over the last search results.

use crate::omdb::{DetailRecord, SearchItem};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
  #[default]
  TitleAsc,
  TitleDesc,
}

impl SortOrder {
  pub fn label(self) -> &'static str {
    match self {
      SortOrder::TitleAsc => "Title A-Z",
      SortOrder::TitleDesc => "Title Z-A",
    }
  }

  pub fn toggled(self) -> Self {
    match self {
      SortOrder::TitleAsc => SortOrder::TitleDesc,
      SortOrder::TitleDesc => SortOrder::TitleAsc,
    }
  }
}

/// Snapshot of the filter panel, taken each time the pipeline runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
  pub sort: SortOrder,
  pub year_from: Option<i32>,
  pub year_to: Option<i32>,
  /// Zero disables the rating filter.
  pub min_rating: f64,
}

impl FilterCriteria {
  pub fn year_active(&self) -> bool {
    self.year_from.is_some() || self.year_to.is_some()
  }

  pub fn rating_active(&self) -> bool {
    self.min_rating > 0.0
  }
}

/// First run of four ASCII digits in `raw`, parsed as a year.
///
/// "2001–2003" yields 2001, "c. 1999" yields 1999, "N/A" yields `None`.
pub fn parse_year(raw: &str) -> Option<i32> {
  let bytes = raw.as_bytes();
  let mut run_start = None;
  for (i, b) in bytes.iter().enumerate() {
    if b.is_ascii_digit() {
      let start = *run_start.get_or_insert(i);
      if i + 1 - start == 4 {
        return raw[start..=i].parse().ok();
      }
    } else {
      run_start = None;
    }
  }
  None
}

pub fn matches_year(raw_year: &str, criteria: &FilterCriteria) -> bool {
  if !criteria.year_active() {
    return true;
  }
  let Some(year) = parse_year(raw_year) else {
    return false;
  };
  criteria.year_from.is_none_or(|from| year >= from) && criteria.year_to.is_none_or(|to| year <= to)
}

/// Outcome of the rating filter for a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingVerdict {
  Pass,
  Fail,
  /// No cached detail yet; shown provisionally until the fetch lands.
  Pending,
}

pub fn rating_verdict(detail: Option<&DetailRecord>, min_rating: f64) -> RatingVerdict {
  if min_rating <= 0.0 {
    return RatingVerdict::Pass;
  }
  match detail {
    None => RatingVerdict::Pending,
    Some(record) => match record.rating() {
      Some(rating) if rating >= min_rating => RatingVerdict::Pass,
      Some(_) => RatingVerdict::Fail,
      // Unrated titles are kept rather than refetched forever.
      None => RatingVerdict::Pass,
    },
  }
}

fn compare_titles(a: &str, b: &str) -> Ordering {
  a.to_lowercase().cmp(&b.to_lowercase())
}

/// Stable, case-insensitive title sort.
pub fn sort_items(items: &mut [SearchItem], order: SortOrder) {
  items.sort_by(|a, b| {
    let ord = compare_titles(&a.title, &b.title);
    match order {
      SortOrder::TitleAsc => ord,
      SortOrder::TitleDesc => ord.reverse(),
    }
  });
}

#[derive(Debug, Default, PartialEq)]
pub struct FilterOutcome {
  pub items: Vec<SearchItem>,
  /// Ids that passed provisionally and need a detail fetch.
  pub pending: Vec<String>,
}

/// Run year filter, rating filter and sort over `items`.
pub fn apply<F>(items: &[SearchItem], criteria: &FilterCriteria, lookup: F) -> FilterOutcome
where
  F: Fn(&str) -> Option<DetailRecord>,
{
  let mut pending = Vec::new();
  let mut kept: Vec<SearchItem> = items
    .iter()
    .filter(|item| matches_year(&item.year, criteria))
    .filter(|item| {
      if !criteria.rating_active() {
        return true;
      }
      match rating_verdict(lookup(&item.id).as_ref(), criteria.min_rating) {
        RatingVerdict::Pass => true,
        RatingVerdict::Fail => false,
        RatingVerdict::Pending => {
          pending.push(item.id.clone());
          true
        }
      }
    })
    .cloned()
    .collect();

  sort_items(&mut kept, criteria.sort);
  FilterOutcome { items: kept, pending }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(id: &str, title: &str, year: &str) -> SearchItem {
    SearchItem { id: id.to_string(), title: title.to_string(), year: year.to_string(), poster: None }
  }

  fn detail(id: &str, rating: Option<&str>) -> DetailRecord {
    DetailRecord {
      id: id.to_string(),
      title: String::new(),
      year: String::new(),
      genre: None,
      imdb_rating: rating.map(str::to_string),
      runtime: None,
      plot: None,
      poster: None,
    }
  }

  fn titles(outcome: &FilterOutcome) -> Vec<&str> {
    outcome.items.iter().map(|i| i.title.as_str()).collect()
  }

  #[test]
  fn parse_year_takes_first_four_digit_run() {
    assert_eq!(parse_year("1999"), Some(1999));
    assert_eq!(parse_year("2001–2003"), Some(2001));
    assert_eq!(parse_year("c. 1985"), Some(1985));
    assert_eq!(parse_year("N/A"), None);
    assert_eq!(parse_year("12 345"), None);
    assert_eq!(parse_year(""), None);
  }

  #[test]
  fn year_bounds_are_inclusive() {
    let items = vec![item("a", "Old", "1999"), item("b", "New", "2005"), item("c", "Range", "2001–2003")];
    let criteria = FilterCriteria { year_from: Some(2000), year_to: Some(2004), ..Default::default() };
    let out = apply(&items, &criteria, |_| None);
    assert_eq!(titles(&out), vec!["Range"]);

    let criteria = FilterCriteria { year_from: Some(1999), year_to: Some(1999), ..Default::default() };
    assert_eq!(titles(&apply(&items, &criteria, |_| None)), vec!["Old"]);
  }

  #[test]
  fn unparseable_year_fails_only_when_year_filter_active() {
    let items = vec![item("a", "Mystery", "N/A")];
    assert_eq!(apply(&items, &FilterCriteria::default(), |_| None).items.len(), 1);

    let criteria = FilterCriteria { year_to: Some(2020), ..Default::default() };
    assert!(apply(&items, &criteria, |_| None).items.is_empty());
  }

  #[test]
  fn rating_filter_uses_cache_and_marks_pending() {
    let items = vec![item("hi", "High", "2000"), item("lo", "Low", "2000"), item("new", "Unknown", "2000")];
    let criteria = FilterCriteria { min_rating: 7.0, ..Default::default() };
    let lookup = |id: &str| match id {
      "hi" => Some(detail("hi", Some("8.1"))),
      "lo" => Some(detail("lo", Some("5.4"))),
      _ => None,
    };

    let out = apply(&items, &criteria, lookup);
    assert_eq!(titles(&out), vec!["High", "Unknown"]);
    assert_eq!(out.pending, vec!["new".to_string()]);
  }

  #[test]
  fn zero_threshold_disables_rating_filter() {
    let items = vec![item("lo", "Low", "2000")];
    let out = apply(&items, &FilterCriteria::default(), |_| Some(detail("lo", Some("1.0"))));
    assert_eq!(out.items.len(), 1);
    assert!(out.pending.is_empty());
  }

  #[test]
  fn cached_unrated_title_passes() {
    assert_eq!(rating_verdict(Some(&detail("x", None)), 5.0), RatingVerdict::Pass);
    assert_eq!(rating_verdict(Some(&detail("x", Some("5.0"))), 5.0), RatingVerdict::Pass);
    assert_eq!(rating_verdict(Some(&detail("x", Some("4.9"))), 5.0), RatingVerdict::Fail);
    assert_eq!(rating_verdict(None, 5.0), RatingVerdict::Pending);
  }

  #[test]
  fn sort_is_case_insensitive_and_stable() {
    let items = vec![
      item("1", "batman", "1989"),
      item("2", "Alien", "1979"),
      item("3", "Batman", "2022"),
      item("4", "alien", "1992"),
    ];
    let asc = apply(&items, &FilterCriteria::default(), |_| None);
    assert_eq!(asc.items.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), vec!["2", "4", "1", "3"]);

    let criteria = FilterCriteria { sort: SortOrder::TitleDesc, ..Default::default() };
    let desc = apply(&items, &criteria, |_| None);
    assert_eq!(desc.items.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), vec!["1", "3", "2", "4"]);
  }
}
