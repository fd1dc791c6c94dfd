//! End-to-end pipeline: stub topology → harvest → normalize.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use chrono::NaiveDate;
use meteo_harvest::fetch::{Fetch, FetchError};
use meteo_harvest::progress::null_progress;
use meteo_harvest::scheduler::{HarvestOptions, harvest};
use meteo_harvest::topology::resolve_cities;
use meteo_harvest_models::MonthPolicy;
use meteo_normalize::{Schema, normalize};

const VALUE_TD: &str = "td class=\"text-center bg-primary\"";

/// Serves a country page with one city behind two header links, and the
/// same full day page for every day URL.
struct StubSite;

impl StubSite {
    fn country_page() -> String {
        let mut html = String::from("<html><body><div class=\"list-group\">");
        for i in 0..2 {
            html.push_str(&format!(
                "<a class=\"list-group-item\" href=\"/annee/{i}\" \
                 title=\"XXXXXXXXXXXXXXXXXXXAnnée {i}\">Année {i}</a>"
            ));
        }
        html.push_str(
            "<a class=\"list-group-item\" href=\"/afrique/ci/abidjan\" \
             title=\"XXXXXXXXXXXXXXXXXXXAbidjan\">Abidjan</a>",
        );
        html.push_str("</div></body></html>");
        html
    }

    fn day_page() -> String {
        let kpis: &[(&str, &str)] = &[
            ("Température maximale", "30°"),
            ("Température minimale", "23°"),
            ("Humidité", "70%"),
            ("Couverture nuageuse", "40%"),
            ("Pression", "1013hPa"),
            ("Précipitations", "2.5mm"),
            ("Vitesse vent", "14km/h"),
            ("Point de rosée", "24°C"),
            ("Visibilité", "10km"),
            ("Indice de chaleur", "36"),
            ("Durée du jour", "12:04"),
        ];
        let mut html = String::from("<html><body><table><tr><th>Détail</th><th>Valeur</th></tr>");
        for (label, value) in kpis {
            html.push_str(&format!(
                "<tr><td>{label}</td><{VALUE_TD}>{value}</td></tr>"
            ));
        }
        html.push_str("<tr><td>Voir le mois complet</td></tr></table></body></html>");
        html
    }
}

impl Fetch for StubSite {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if url.ends_with("/afrique/ci") {
            Ok(Self::country_page())
        } else {
            Ok(Self::day_page())
        }
    }
}

#[tokio::test]
async fn one_city_one_month_yields_one_typed_row_per_day() {
    let site = StubSite;
    let cities = resolve_cities(&site, "https://example.net/afrique/ci", 2)
        .await
        .unwrap();
    assert_eq!(cities.len(), 1);
    assert_eq!(cities[0].name, "Abidjan");

    let options = HarvestOptions {
        backoff_base: Duration::from_millis(1),
        month_policy: MonthPolicy::full_years().with_months(2024, 2..=2),
        ..HarvestOptions::default()
    };
    let output = harvest(
        &site,
        &cities,
        &[2024],
        &options,
        &null_progress(),
        &AtomicBool::new(false),
    )
    .await;

    // February 2024 is a leap month: 29 day pages, no failures.
    assert_eq!(output.summary.scheduled, 29);
    assert_eq!(output.records.len(), 29);
    assert!(output.failures.is_empty());

    let (table, report) = normalize(&output.records, &Schema::default());

    assert_eq!(report.input_rows, 29);
    assert_eq!(report.kept, 29);
    assert_eq!(table.len(), 29);
    assert!(table.columns.contains(&"temperature-maximale".to_owned()));
    assert!(!table.columns.contains(&"duree-du-jour".to_owned()));

    let mut dates: Vec<NaiveDate> = table.rows.iter().map(|r| r.date).collect();
    dates.sort_unstable();
    assert_eq!(dates.first(), Some(&NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
    assert_eq!(dates.last(), Some(&NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));

    for row in &table.rows {
        assert_eq!(row.values["temperature-maximale"], 30.0);
        assert_eq!(row.values["humidite"], 70.0);
        assert_eq!(row.values["pression"], 1013.0);
        assert_eq!(row.values["precipitations"], 2.5);
        assert_eq!(row.values["indice-de-chaleur"], 36.0);
    }
}

#[tokio::test]
async fn progress_handle_is_shareable_across_the_pipeline() {
    // Arc<dyn ProgressCallback> handles pass freely between CLI and
    // scheduler; NullProgress stands in for the indicatif backend here.
    let progress: Arc<dyn meteo_harvest::progress::ProgressCallback> = null_progress();
    let site = StubSite;
    let cities = resolve_cities(&site, "https://example.net/afrique/ci", 2)
        .await
        .unwrap();
    let options = HarvestOptions {
        month_policy: MonthPolicy::full_years().with_months(2023, 1..=1),
        ..HarvestOptions::default()
    };
    let output = harvest(
        &site,
        &cities,
        &[2023],
        &options,
        &progress,
        &AtomicBool::new(false),
    )
    .await;
    assert_eq!(output.records.len(), 31);
}
