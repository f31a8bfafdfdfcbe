use std::{cell::RefCell, io};

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;

use ppmpro_timesheet_util::{
    ActivityUpdate, Error, HoursSource, Operations, Timesheet, TimesheetApi, TimesheetId,
    TimesheetService, TimesheetSummary, error::Result, models::ppmpro::Note,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Recent,
    Timesheet(TimesheetId),
    Update(TimesheetId, Vec<ActivityUpdate>),
    Submit(TimesheetId, Note),
    ApproveAll(Note),
}

struct FakeApi {
    summaries: Vec<TimesheetSummary>,
    timesheet: Timesheet,
    fail_update: bool,
    calls: RefCell<Vec<Call>>,
}

impl FakeApi {
    fn new() -> Self {
        Self {
            summaries: serde_json::from_value(json!([
                {"id": 1, "startDate": "2024-03-04"},
                {"id": 2, "startDate": "2024-03-11"}
            ]))
            .unwrap(),
            timesheet: serde_json::from_value(json!({
                "id": 2,
                "startDate": "2024-03-11",
                "stateName": "Open",
                "activities": [
                    {
                        "id": 11, "projectId": 10, "projectName": "Alpha", "taskId": 100,
                        "type": "TASK", "state": "OPEN",
                        "entries": [
                            {"entryDate": "2024-03-13", "entryHours": 4.0},
                            {"entryDate": "2024-03-14", "entryHours": 0.0}
                        ]
                    },
                    {
                        "id": 12, "projectId": 20, "projectName": "Beta", "taskId": 200,
                        "type": "TASK", "state": "OPEN",
                        "entries": [
                            {"entryDate": "2024-03-13", "entryHours": 4.0},
                            {"entryDate": "2024-03-14", "entryHours": 0.0}
                        ]
                    }
                ]
            }))
            .unwrap(),
            fail_update: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl TimesheetApi for FakeApi {
    async fn recent(&self) -> Result<Vec<TimesheetSummary>> {
        self.calls.borrow_mut().push(Call::Recent);
        Ok(self.summaries.clone())
    }

    async fn timesheet(&self, id: &TimesheetId) -> Result<Timesheet> {
        self.calls.borrow_mut().push(Call::Timesheet(id.clone()));
        Ok(self.timesheet.clone())
    }

    async fn update_activities(&self, id: &TimesheetId, updates: &[ActivityUpdate]) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(Call::Update(id.clone(), updates.to_vec()));
        if self.fail_update {
            return Err(Error::Http {
                status: 500,
                reason: "Internal Server Error".into(),
            });
        }
        Ok(())
    }

    async fn submit(&self, id: &TimesheetId, note: &Note) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(Call::Submit(id.clone(), note.clone()));
        Ok(())
    }

    async fn approve_all(&self, note: &Note) -> Result<()> {
        self.calls.borrow_mut().push(Call::ApproveAll(note.clone()));
        Ok(())
    }
}

fn thursday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
}

fn today_hours(updates: &[ActivityUpdate]) -> Vec<f64> {
    updates
        .iter()
        .flat_map(|u| &u.entries)
        .filter(|e| e.entry_date == "2024-03-14")
        .map(|e| e.hours())
        .collect()
}

#[tokio::test]
async fn locate_only_makes_a_single_request() {
    let service = TimesheetService::new(FakeApi::new());
    let mut out: Vec<u8> = Vec::new();

    let id = service
        .run(Operations::default(), thursday(), None, &mut out)
        .await
        .unwrap();

    assert_eq!(id, TimesheetId::Number(2));
    assert_eq!(service.api.calls(), vec![Call::Recent]);
    assert!(out.is_empty());
}

#[tokio::test]
async fn all_operations_run_in_order() {
    let service = TimesheetService::new(FakeApi::new());
    let operations = Operations {
        report: true,
        update: true,
        submit: true,
        approve: true,
    };
    let mut out: Vec<u8> = Vec::new();

    service
        .run(operations, thursday(), Some(&[3.0, 5.0]), &mut out)
        .await
        .unwrap();

    let calls = service.api.calls();
    assert_eq!(calls.len(), 5);
    assert_eq!(calls[0], Call::Recent);
    assert_eq!(calls[1], Call::Timesheet(TimesheetId::Number(2)));
    match &calls[2] {
        Call::Update(id, updates) => {
            assert_eq!(id, &TimesheetId::Number(2));
            assert_eq!(today_hours(updates), vec![3.0, 5.0]);
        }
        other => panic!("expected update, got {other:?}"),
    }
    assert_eq!(calls[3], Call::Submit(TimesheetId::Number(2), Note::default()));
    assert_eq!(calls[4], Call::ApproveAll(Note::default()));

    let report = String::from_utf8(out).unwrap();
    assert!(report.starts_with("[Open]"));
    assert!(report.contains("TOTALS:\t8.0   0.0   "));
}

#[tokio::test]
async fn mismatched_override_falls_back_to_even_split() {
    let service = TimesheetService::new(FakeApi::new());
    let operations = Operations {
        update: true,
        ..Operations::default()
    };

    service
        .run(operations, thursday(), Some(&[1.0, 2.0, 3.0]), &mut io::sink())
        .await
        .unwrap();

    match &service.api.calls()[2] {
        Call::Update(_, updates) => assert_eq!(today_hours(updates), vec![4.0, 4.0]),
        other => panic!("expected update, got {other:?}"),
    }
}

struct Tracker;

impl HoursSource for Tracker {
    fn hours(&self, timesheet: &Timesheet) -> Vec<f64> {
        (1..=timesheet.activities.len()).map(|i| i as f64).collect()
    }
}

#[tokio::test]
async fn custom_hours_source_replaces_even_split() {
    let service = TimesheetService::new(FakeApi::new()).with_hours_source(Tracker);
    let operations = Operations {
        update: true,
        ..Operations::default()
    };

    service
        .run(operations, thursday(), None, &mut io::sink())
        .await
        .unwrap();

    match &service.api.calls()[2] {
        Call::Update(_, updates) => assert_eq!(today_hours(updates), vec![1.0, 2.0]),
        other => panic!("expected update, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_week_stops_before_fetching() {
    let service = TimesheetService::new(FakeApi::new());
    let operations = Operations {
        report: true,
        submit: true,
        ..Operations::default()
    };
    let sunday_before = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();

    let err = service
        .run(operations, sunday_before, None, &mut io::sink())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TimesheetNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(service.api.calls(), vec![Call::Recent]);
}

#[tokio::test]
async fn failed_update_skips_later_steps() {
    let mut api = FakeApi::new();
    api.fail_update = true;
    let service = TimesheetService::new(api);
    let operations = Operations {
        update: true,
        submit: true,
        approve: true,
        ..Operations::default()
    };

    let err = service
        .run(operations, thursday(), None, &mut io::sink())
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), 1);
    assert_eq!(service.api.calls().len(), 3);
}
