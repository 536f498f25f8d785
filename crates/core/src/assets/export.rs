//! Delimited text export of assets.
//!
//! Escaping is lossy: commas and line breaks inside text fields become
//! spaces instead of being quoted, so each asset is one line of exactly ten
//! fields.

use super::AssetView;

/// Column header, in output order.
pub const EXPORT_HEADER: &str =
    "id,name,reference,category,status,acquisitionDate,value,serialNumber,location,serviceName";

/// Suggested file name for the download.
pub const EXPORT_FILENAME: &str = "assets.csv";

/// Render the header plus one line per asset, in the order given.
pub fn render_table(assets: &[AssetView]) -> String {
    let mut out = String::with_capacity(EXPORT_HEADER.len() + 1 + assets.len() * 96);
    out.push_str(EXPORT_HEADER);
    out.push('\n');

    for view in assets {
        let data = &view.asset.data;
        let fields = [
            view.asset.id.to_string(),
            clean(Some(&data.name)),
            clean(data.reference.as_deref()),
            data.category.map(|c| c.as_str().to_string()).unwrap_or_default(),
            data.status.as_str().to_string(),
            data.acquisition_date.map(|d| d.to_string()).unwrap_or_default(),
            data.value.map(|v| v.to_string()).unwrap_or_default(),
            clean(data.serial_number.as_deref()),
            clean(data.location.as_deref()),
            clean(view.service_name.as_deref()),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}

/// Missing text renders empty; commas and line breaks become spaces.
fn clean(value: Option<&str>) -> String {
    value
        .map(|s| s.replace([',', '\n', '\r'], " "))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::assets::{Asset, AssetCategory, AssetData, AssetStatus};
    use crate::types::Date;

    fn view(id: i64, name: &str, service_name: Option<&str>) -> AssetView {
        AssetView {
            asset: Asset {
                id,
                data: AssetData {
                    name: name.into(),
                    reference: None,
                    description: Some("has, commas".into()),
                    category: None,
                    status: AssetStatus::Broken,
                    acquisition_date: None,
                    value: None,
                    serial_number: None,
                    location: None,
                    service_id: None,
                    created_at: Utc::now(),
                    updated_at: None,
                    created_by: "system".into(),
                    modified_by: None,
                },
            },
            service_name: service_name.map(Into::into),
        }
    }

    #[test]
    fn empty_export_is_header_only() {
        assert_eq!(render_table(&[]), format!("{EXPORT_HEADER}\n"));
    }

    #[test]
    fn missing_fields_render_empty_not_null() {
        let out = render_table(&[view(1, "Desk", None)]);
        let line = out.lines().nth(1).unwrap();
        assert_eq!(line, "1,Desk,,,BROKEN,,,,,");
        assert!(!out.contains("null"));
    }

    #[test]
    fn commas_in_text_become_spaces() {
        let mut v = view(2, "Chair, ergonomic", Some("Finance, Paris"));
        v.asset.data.location = Some("Bldg A, room 3".into());
        let out = render_table(&[v]);
        let line = out.lines().nth(1).unwrap();

        assert_eq!(line.split(',').count(), 10);
        assert!(line.contains("Chair  ergonomic"));
        assert!(line.ends_with("Finance  Paris"));
    }

    #[test]
    fn full_row_keeps_column_order_and_exact_value() {
        let mut v = view(3, "Theodolite", Some("Survey"));
        v.asset.data.reference = Some("TH-9".into());
        v.asset.data.category = Some(AssetCategory::Topographic);
        v.asset.data.acquisition_date = Date::from_ymd_opt(2021, 1, 5);
        v.asset.data.value = Some(Decimal::from_str("1000.00").unwrap());
        v.asset.data.serial_number = Some("X1".into());
        v.asset.data.location = Some("Depot".into());

        let out = render_table(&[v]);
        assert_eq!(
            out.lines().nth(1).unwrap(),
            "3,Theodolite,TH-9,TOPOGRAPHIC,BROKEN,2021-01-05,1000.00,X1,Depot,Survey"
        );
    }

    #[test]
    fn line_breaks_in_text_become_spaces() {
        let mut v = view(4, "Desk\nlarge", None);
        v.asset.data.location = Some("Room 2\r\nBldg B".into());
        let out = render_table(&[v]);

        assert_eq!(out.lines().count(), 2);
        assert_eq!(out.lines().nth(1).unwrap(), "4,Desk large,,,BROKEN,,,,Room 2  Bldg B,");
    }
}
