// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote folder paths and photo file names.
//!
//! Photos are filed region first: `{region}/{code}-{user}-{farm:02}/{YYYYMMDD}`,
//! where `code` is the region's three-letter code (`UNK` when unknown).

use chrono::NaiveDate;
use paddy_geo::region_code;

fn surveyor_folder(region: &str, surveyor: &str, farm_number: u8) -> String {
    format!("{}-{surveyor}-{farm_number:02}", region_code(region))
}

/// Folder path for one surveyor's farm on one day.
pub fn destination_path(region: &str, surveyor: &str, farm_number: u8, date: NaiveDate) -> String {
    format!(
        "{region}/{}/{}",
        surveyor_folder(region, surveyor, farm_number),
        date.format("%Y%m%d")
    )
}

/// File name of the `sequence`-th photo of a survey.
pub fn photo_file_name(
    region: &str,
    surveyor: &str,
    farm_number: u8,
    date: NaiveDate,
    sequence: u32,
) -> String {
    format!(
        "{}_{}_{sequence:02}.jpg",
        surveyor_folder(region, surveyor, farm_number),
        date.format("%Y%m%d")
    )
}
