use crate::error::NoData;
use crate::roster::StudentSelection;
use crate::table::GradeTable;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Grade (out of 20) a student needs to pass.
pub const PASS_MARK: f64 = 10.0;

/// Half-up rounding to one decimal: `floor(10*x + 0.5) / 10`.
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

pub fn round_off_2_decimal(x: f64) -> f64 {
    ((100.0 * x) + 0.5).floor() / 100.0
}

/// Below / at / above the pass mark. Both charts color bars with this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GradeBand {
    BelowPassing,
    Boundary,
    Passing,
}

impl GradeBand {
    pub fn classify(grade: f64) -> Self {
        if grade < PASS_MARK {
            GradeBand::BelowPassing
        } else if grade == PASS_MARK {
            GradeBand::Boundary
        } else {
            GradeBand::Passing
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSubjectStats {
    pub subject: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub grade_count: usize,
}

/// Whole-table mean/min/max per subject, regardless of who is selected.
pub fn class_statistics(table: &GradeTable) -> BTreeMap<String, ClassSubjectStats> {
    let mut out: BTreeMap<String, ClassSubjectStats> = BTreeMap::new();
    for r in table.records() {
        let s = out
            .entry(r.subject.clone())
            .or_insert_with(|| ClassSubjectStats {
                subject: r.subject.clone(),
                mean: 0.0,
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
                grade_count: 0,
            });
        // `mean` holds the running sum until the pass below.
        s.mean += r.grade;
        s.min = s.min.min(r.grade);
        s.max = s.max.max(r.grade);
        s.grade_count += 1;
    }
    for s in out.values_mut() {
        s.mean /= s.grade_count as f64;
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectComparisonRow {
    pub subject: String,
    pub student_grade: f64,
    /// Rows merged into `student_grade` (their mean) when a subject repeats.
    pub record_count: usize,
    pub class_mean: Option<f64>,
    pub class_min: Option<f64>,
    pub class_max: Option<f64>,
    pub band: GradeBand,
}

/// One row per distinct subject of the selection (optionally one unit only),
/// in the order subjects first appear, next to the class-wide statistics.
pub fn subject_comparison(
    table: &GradeTable,
    selection: &StudentSelection,
    unit: Option<&str>,
) -> Result<Vec<SubjectComparisonRow>, NoData> {
    let mut order: Vec<&str> = Vec::new();
    let mut grades: HashMap<&str, Vec<f64>> = HashMap::new();
    for r in selection
        .records
        .iter()
        .filter(|r| unit.map_or(true, |u| r.unit == u))
    {
        let e = grades.entry(r.subject.as_str()).or_insert_with(|| {
            order.push(r.subject.as_str());
            Vec::new()
        });
        e.push(r.grade);
    }
    if order.is_empty() {
        return Err(NoData::EmptyFilterResult {
            unit: unit.map(|u| u.to_string()),
        });
    }

    let class = class_statistics(table);
    Ok(order
        .into_iter()
        .map(|subject| {
            let values = grades.get(subject).map(Vec::as_slice).unwrap_or(&[]);
            let student_grade = values.iter().sum::<f64>() / values.len() as f64;
            let stats = class.get(subject);
            SubjectComparisonRow {
                subject: subject.to_string(),
                student_grade,
                record_count: values.len(),
                class_mean: stats.map(|s| s.mean),
                class_min: stats.map(|s| s.min),
                class_max: stats.map(|s| s.max),
                band: GradeBand::classify(student_grade),
            }
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitAverageRow {
    pub unit: String,
    /// Rounded to one decimal; `band` is taken from this rounded value.
    pub mean_grade: f64,
    pub subject_count: usize,
    pub band: GradeBand,
}

/// Per-unit mean over every record of the selection, ascending by unit code.
pub fn unit_averages(selection: &StudentSelection) -> Result<Vec<UnitAverageRow>, NoData> {
    #[derive(Default)]
    struct Acc<'a> {
        sum: f64,
        n: usize,
        subjects: HashSet<&'a str>,
    }

    let mut by_unit: BTreeMap<&str, Acc<'_>> = BTreeMap::new();
    for r in &selection.records {
        let acc = by_unit.entry(r.unit.as_str()).or_default();
        acc.sum += r.grade;
        acc.n += 1;
        acc.subjects.insert(r.subject.as_str());
    }
    if by_unit.is_empty() {
        return Err(NoData::EmptyFilterResult { unit: None });
    }

    Ok(by_unit
        .into_iter()
        .map(|(unit, acc)| {
            let mean_grade = round_off_1_decimal(acc.sum / acc.n as f64);
            UnitAverageRow {
                unit: unit.to_string(),
                mean_grade,
                subject_count: acc.subjects.len(),
                band: GradeBand::classify(mean_grade),
            }
        })
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub mean_grade: f64,
    pub distinct_subject_count: usize,
}

impl OverallStats {
    pub fn mean_grade_display(&self) -> f64 {
        round_off_2_decimal(self.mean_grade)
    }

    pub fn passing(&self) -> bool {
        self.mean_grade >= PASS_MARK
    }
}

/// Mean and distinct subject count across all units of the selection; the
/// unit filter never applies here.
pub fn overall(selection: &StudentSelection) -> Result<OverallStats, NoData> {
    if selection.records.is_empty() {
        return Err(NoData::EmptyFilterResult { unit: None });
    }
    let sum: f64 = selection.records.iter().map(|r| r.grade).sum();
    let subjects: HashSet<&str> = selection
        .records
        .iter()
        .map(|r| r.subject.as_str())
        .collect();
    Ok(OverallStats {
        mean_grade: sum / selection.records.len() as f64,
        distinct_subject_count: subjects.len(),
    })
}
