/*!

This is the long-form manual for `course_bundles` and `selsheet`.

## Input

The input is a course schedule exported from the student information system,
as an Excel workbook (`.xlsx` or `.xls`). Only one worksheet is read: the first
one, or the one given with `--excel-worksheet-name`.

The header row does not have to be the first row. The first 20 rows are
scanned, and the first of them containing at least 3 known column names is
the header. The known column names are:

`Section ID`, `Dept`, `Section Name`, `Start Date`, `End Date`, `Bldg`, `Room`,
`Days`, `Start Time`, `End Time`, `# of Weeks`, `Section Capacity`,
`Primary Faculty Name`, `Instr Method`

Only `Section Name` is mandatory. Every row below the header whose section name
reads `<SUBJECT>-<NUMBER>-<MODE><SEQUENCE>` describes a section, for example:

|  Section Name  | Dept  | Days | Start Time | End Time | Section Capacity |
|----------------|-------|------|------------|----------|------------------|
| ENGL-1181-C01  | COMMC | MW   | 9:00 AM    | 10:50 AM | 22               |
| ENGL-1170-C01  | COMMC | MW   | 11:00 AM   | 11:50 AM | 6                |
| ENGL-1210-H04  | COMMS | T    | 1:00 PM    | 2:15 PM  | 24               |

All the other rows (totals, notes, blank lines) are ignored.

The mode letter gives the delivery mode:
* `C` in person at the center campus
* `S` in person at the south campus
* `O` online
* `H` hybrid, whose campus follows the department (`COMMC` for the center
  campus, `COMMS` for the south campus)
* `R` remote

Times may be Excel times, or text such as `13:30` or `1:30 PM`. Dates may be
Excel dates or text such as `1/13/25`.

## Bundles

Sections taught together by one instructor are grouped into bundles. Three
kinds of bundles are recognised, in this order. A section never belongs to more
than one bundle.

### Paired corequisite

Each section of the anchor course (`ENGL 1170`) takes the first two sections of
the satellite course (`ENGL 1181`) that:
* have a capacity below 26
* have the same number of weeks, and start within 14 days of the anchor section
* are not taught in person at another campus
* and either meet in the same room, name the anchor section in their faculty
  field (or are named by it), or share its mode with a sequence number within 2
  of the anchor's

An anchor section with fewer than two candidates stays alone and is flagged
`Missing paired ENGL 1181 sections - needs review`.

### Paired split

A section of `ENGL 2410` is paired with the first section of `ENGL 2420` with
the same mode and number of weeks, starting within 14 days. In person, both
sections must also share the building, the room and the days. Otherwise both
must have a capacity below 26 and sequence numbers within 2.

### Online low capacity

Online satellite sections with a capacity below 26 that are left alone are
paired with each other when their sequence numbers are within 2. Both members
are flagged `Appears bundled with in-person ENGL 1170 - please verify`. The
remaining low capacity satellite sections are flagged
`Capacity suggests co-req but no matching ENGL 1170 found`.

## Flags

Every section may carry free-text flags for the schedulers to review. Besides
the flags of the bundle detection:

* `Room conflict with <section> (<days> <time>)`: two sections share a room,
  a meeting day and overlapping times in overlapping date ranges, outside of a
  bundle.
* `Same section appears on multiple rows (<days>) - please review/consolidate`:
  the conflict is between two rows of the same section.
* `Capacity <n> exceeds max of 28 for writing courses`, and
  `Capacity <n> exceeds max of 10 for ENGL 1170`.
* `Scheduled <h> hrs/wk, expected ~<e> hrs/wk for <c>-credit <w>-week course`:
  the weekly meeting hours differ from `credits × 16 / weeks` by half an hour
  or more. Only in person and remote sections are checked, and a section found
  on several rows (a split schedule) is skipped.

## Campus sort

With `--campus-sort`, the rows of the sheet are first split by campus, and a
selection sheet is produced for each of the center, south and online campuses
(plus one for the whole sheet). Only the `ENGL` rows are bundled and flagged.
The `EAPP` rows follow in the original data, greyed out.

## The rules file

All the thresholds and course tables can be changed with a JSON file passed
with `--config`. Every field is optional:

```json
{
  "outputSettings": {
    "outputPath": "summary.json",
    "campusSort": false
  },
  "inputFiles": [
    { "filePath": "schedule.xlsx", "excelWorksheetName": "Sheet1" }
  ],
  "rules": {
    "headerScanRows": 20,
    "headerKeywordThreshold": 3,
    "dateAlignmentDays": 14,
    "sequenceProximity": 2,
    "satelliteCapacityLimit": 26,
    "standardCapacityMax": 28,
    "anchorCapacityMax": 10,
    "hoursTolerance": 0.5,
    "defaultWeeks": 16
  },
  "catalog": {
    "anchor": "ENGL 1170",
    "satellite": "ENGL 1181",
    "sequenceFirst": "ENGL 2410",
    "sequenceSecond": "ENGL 2420",
    "creditHours": { "ENGL 1181": 4 },
    "equatedHours": { "ENGL 1181": 5 },
    "centerDepartment": "COMMC",
    "southDepartment": "COMMS"
  }
}
```

The files in `inputFiles` are relative to the rules file. The tables in
`creditHours` and `equatedHours` are merged into the default tables.

## Output

A JSON summary lists every input file: the sorted sections, the bundles, the
flags and the layout of the selection sheet (fills, borders, row heights and
the name of the workbook to write). A file given twice only appears once, with
its last result. The summary is printed, or written to `--out` (or
`outputPath`), and can be compared to a reference with `--reference`.

*/
