/*!
# CGPA Calculator

A browser-based CGPA (cumulative grade point average) calculator, built in Rust.

## Overview

The user fills in a single editable table of courses, each with a name, a
credit count and a letter grade, and the page shows the credit-weighted
average grade point as the table changes. State is held in memory for the
life of the process; nothing is saved.

## Architecture

### Core
- **Row Store** (`store`) - Ordered list of course rows. Every mutation is an
  `Action` run through a pure reducer that produces a new immutable
  `Snapshot`; subscribers hear about each new snapshot synchronously.
- **Aggregator** (`aggregate`) - Pure function from a row slice to a `Cgpa`,
  either a value or `NoValue`.
- **Calculator** (`calculator`) - Store plus the CGPA of its current
  snapshot, recomputed before every mutation returns.

### Front ends
- **Web** (`app`, feature `web`) - axum server with the single page and a
  JSON API over the calculator.
- **Terminal** (`command`, `display`, binary `cgpa-cli`) - Command prompt
  over the same calculator.

## Grade scale

| Label | Points |
|-------|--------|
| O     | 10     |
| A+    | 9      |
| A     | 8      |
| B+    | 7      |
| B     | 6      |
| C+    | 5      |
| F     | 0      |

Rows without a grade, and graded rows whose credits are not a plain
non-negative number, are shown but left out of the average.

## REST API Endpoints

- `GET /api/grades` - Grade scale
- `GET /api/rows` - Rows and CGPA
- `POST /api/rows` - Add a row
- `PATCH /api/rows/{key}` - Edit course and/or credits
- `PUT /api/rows/{key}/grade` - Set a grade
- `DELETE /api/rows/{key}` - Delete a row
- `POST /api/clear` - Remove every row
*/

pub mod aggregate;
#[cfg(feature = "web")]
pub mod app;
pub mod calculator;
pub mod command;
pub mod display;
pub mod grade;
pub mod row;
pub mod store;

pub use aggregate::{Cgpa, Tally, compute_cgpa};
pub use calculator::Calculator;
pub use grade::{Grade, GradeError};
pub use row::{Credits, Row, RowKey, RowPatch};
pub use store::{Action, RowStore, Snapshot, StoreError};
