//! Build script for scte35-inserter.
//!
//! Exports `COMMIT_ID` and `BUILD_REL_DATE` through
//! `gst_plugin_version_helper`; the command line version string includes the
//! commit.

// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

fn main() {
    gst_plugin_version_helper::info()
}
