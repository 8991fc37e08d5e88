// src/dashboard.rs
//! JSON payloads handed to the chart renderer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    compliance::{ComplianceStatus, ExpiryEntry},
    series::TimeSeriesTable,
    totals::TotalsMap,
};

pub const BEHAVIOUR_COMPONENTS: [(&str, &str); 5] = [
    ("Safe Behaviour", "safe behaviour"),
    ("Unsafe Behaviour", "unsafe behaviour"),
    ("Safe Condition", "safe condition"),
    ("Unsafe Condition", "unsafe condition"),
    ("Positive Behaviour/Action", "positive behaviour/action"),
];

pub const INCIDENT_COMPONENTS: [(&str, &str); 5] = [
    ("Near Miss", "near miss"),
    ("Incident", "incident"),
    ("Accident", "accident"),
    ("Property/Equipment Damage", "property or equipment damage"),
    ("Fatality", "fatality"),
];

pub const COMPLIANCE_PLACEHOLDER: &str =
    "Publish your Compliance Expiries tab as CSV and set SHEETKPI_EXPIRIES_CSV to show items here.";

/// Group thousands and keep at most three fraction digits:
/// `1234.5` → `"1,234.5"`, `-0.0001` → `"0"`.
pub fn format_count(n: f64) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }
    let fixed = format!("{:.3}", n.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if !frac.is_empty() {
        grouped.push('.');
        grouped.push_str(frac);
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac.is_empty();
    if n < 0.0 && !is_zero {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub label: &'static str,
    pub value: f64,
    pub display: String,
}

impl Kpi {
    fn count(label: &'static str, value: f64) -> Self {
        Self {
            label,
            value,
            display: format_count(value),
        }
    }

    fn rate(label: &'static str, value: f64) -> Self {
        Self {
            label,
            value,
            display: format!("{:.2}", value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub labels: Vec<&'static str>,
    pub values: Vec<f64>,
    /// Suggested name for an exported image.
    pub file_stem: &'static str,
}

impl BarChart {
    fn from_components(
        totals: &TotalsMap,
        heading: &str,
        total: f64,
        components: &[(&'static str, &'static str)],
        file_stem: &'static str,
    ) -> Self {
        Self {
            title: format!("{}: {}", heading, format_count(total)),
            labels: components.iter().map(|(label, _)| *label).collect(),
            values: components
                .iter()
                .map(|(_, key)| totals.get_or_zero(key))
                .collect(),
            file_stem,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceRow {
    pub item: String,
    pub days: i64,
    pub display_days: String,
    pub status: ComplianceStatus,
    pub label: &'static str,
    pub class: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceTable {
    pub rows: Vec<ComplianceRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

impl ComplianceTable {
    pub fn build(entries: Option<&[ExpiryEntry]>) -> Self {
        let entries = entries.unwrap_or_default();
        if entries.is_empty() {
            return Self {
                rows: Vec::new(),
                note: Some(COMPLIANCE_PLACEHOLDER),
            };
        }
        let rows = entries
            .iter()
            .map(|e| {
                let status = e.status();
                ComplianceRow {
                    item: e.item.clone(),
                    days: e.days,
                    display_days: format_count(e.days as f64),
                    status,
                    label: status.label(),
                    class: status.css_class(),
                }
            })
            .collect();
        Self { rows, note: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub generated_at: DateTime<Utc>,
    pub kpis: Vec<Kpi>,
    pub behaviour: BarChart,
    pub incidents: BarChart,
    pub compliance: ComplianceTable,
}

impl Dashboard {
    pub fn build(totals: &TotalsMap, expiries: Option<&[ExpiryEntry]>) -> Self {
        let behaviour_keys: Vec<&str> = BEHAVIOUR_COMPONENTS.iter().map(|(_, k)| *k).collect();
        let incident_keys: Vec<&str> = INCIDENT_COMPONENTS.iter().map(|(_, k)| *k).collect();

        // sheets without a combined total row still get one from the parts
        let total_behaviour = totals
            .lookup_or_sum(&["total behaviour"], behaviour_keys.as_slice())
            .unwrap_or(0.0);
        let total_events = totals
            .lookup_or_sum(&["total events"], incident_keys.as_slice())
            .unwrap_or(0.0);

        let kpis = vec![
            Kpi::count("Total Behaviour", total_behaviour),
            Kpi::count("Total Events", total_events),
            Kpi::count(
                "Total Man Hours (YTD)",
                totals.get_or_zero("total man hours (ytd)"),
            ),
            Kpi::rate("LTIFR (YTD)", totals.get_or_zero("ltifr (ytd)")),
            Kpi::count("LTI (YTD)", totals.get_or_zero("lti (ytd)")),
        ];

        Self {
            generated_at: Utc::now(),
            kpis,
            behaviour: BarChart::from_components(
                totals,
                "Total Behaviour",
                total_behaviour,
                &BEHAVIOUR_COMPONENTS,
                "behaviour",
            ),
            incidents: BarChart::from_components(
                totals,
                "Total Events",
                total_events,
                &INCIDENT_COMPONENTS,
                "incidents",
            ),
            compliance: ComplianceTable::build(expiries),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSeries {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPayload {
    pub generated_at: DateTime<Utc>,
    pub periods: Vec<String>,
    pub series: Vec<NamedSeries>,
}

impl SeriesPayload {
    /// Every requested column, zero-filled when the header lacks it.
    /// No columns requested means every column but the period one.
    pub fn build(table: &TimeSeriesTable, columns: &[String]) -> Self {
        let names: Vec<String> = if columns.is_empty() {
            table
                .headers
                .iter()
                .enumerate()
                .filter(|(i, h)| *i != table.period_column && !h.is_empty())
                .map(|(_, h)| h.clone())
                .collect()
        } else {
            columns.to_vec()
        };

        let series = names
            .into_iter()
            .map(|name| {
                let values = table.column_or_zero(&name);
                NamedSeries { name, values }
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            periods: table.periods(),
            series,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compliance::expiries_from_csv, process::tokenize::TokenizerMode,
        totals::TotalsResolver,
    };

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0.0), "0");
        assert_eq!(format_count(42.0), "42");
        assert_eq!(format_count(1234.0), "1,234");
        assert_eq!(format_count(1234567.891), "1,234,567.891");
        assert_eq!(format_count(1234.5), "1,234.5");
        assert_eq!(format_count(-98765.0), "-98,765");
        assert_eq!(format_count(0.12345), "0.123");
        assert_eq!(format_count(-0.0001), "0");
        assert_eq!(format_count(f64::NAN), "0");
        assert_eq!(format_count(100.0), "100");
    }

    #[test]
    fn test_dashboard_from_totals() {
        let totals = TotalsResolver::default().resolve_csv(
            "Total Behaviour: 1500\n\
             Safe Behaviour,900\n\
             Unsafe Behaviour,600\n\
             Near Miss,3\n\
             Incident,2\n\
             Property or Equipment Damage,1\n\
             LTIFR (YTD),0.456\n\
             Total Man Hours (YTD),\"120,400\"\n",
            TokenizerMode::QuoteAware,
        );
        let dash = Dashboard::build(&totals, None);

        assert_eq!(dash.kpis[0].display, "1,500");
        // no "Total Events" row: summed from the incident parts
        assert_eq!(dash.kpis[1].value, 6.0);
        assert_eq!(dash.kpis[2].display, "120,400");
        assert_eq!(dash.kpis[3].display, "0.46");
        assert_eq!(dash.kpis[4].value, 0.0);

        assert_eq!(dash.behaviour.title, "Total Behaviour: 1,500");
        assert_eq!(dash.behaviour.values, vec![900.0, 600.0, 0.0, 0.0, 0.0]);
        assert_eq!(dash.incidents.title, "Total Events: 6");
        assert_eq!(dash.incidents.values, vec![3.0, 2.0, 0.0, 1.0, 0.0]);
        assert_eq!(dash.incidents.labels[3], "Property/Equipment Damage");

        assert!(dash.compliance.rows.is_empty());
        assert_eq!(dash.compliance.note, Some(COMPLIANCE_PLACEHOLDER));
    }

    #[test]
    fn test_compliance_table_rows() {
        let entries = expiries_from_csv(
            "Item,Days\nPermit,40\nCert,-2\nTag,1500\n",
            TokenizerMode::QuoteAware,
        );
        let table = ComplianceTable::build(Some(entries.as_slice()));
        assert!(table.note.is_none());
        let summary: Vec<(&str, &str, &str)> = table
            .rows
            .iter()
            .map(|r| (r.item.as_str(), r.display_days.as_str(), r.class))
            .collect();
        assert_eq!(
            summary,
            vec![("Cert", "-2", "bad"), ("Permit", "40", "ok"), ("Tag", "1,500", "ok")]
        );

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["rows"][0]["status"], "Expired");
        assert_eq!(json["rows"][1]["label"], "OK");
        assert!(json.get("note").is_none());
    }

    #[test]
    fn test_series_payload() {
        let table = TimeSeriesTable::from_csv(
            "Month,Incidents,Hours\nJan,1,100\nFeb,2,200\n",
            TokenizerMode::QuoteAware,
        );
        let all = SeriesPayload::build(&table, &[]);
        assert_eq!(all.periods, vec!["Jan", "Feb"]);
        let names: Vec<&str> = all.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Incidents", "Hours"]);

        let picked = SeriesPayload::build(&table, &["Hours".into(), "Fatalities".into()]);
        assert_eq!(picked.series[0].values, vec![100.0, 200.0]);
        assert_eq!(picked.series[1].values, vec![0.0, 0.0]);
    }
}
