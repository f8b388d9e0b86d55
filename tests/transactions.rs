mod common;

use common::{Event, RecordingConnection, WorkError};
use relq::entity::{self, user, User};
use relq::executor::Executor;
use relq::transaction::{
    run_in_transaction, run_in_transaction_with, IsolationLevel, RunError, Transaction,
    TransactionError, TransactionState,
};
use std::panic::{self, AssertUnwindSafe};

#[test]
fn test_successful_work_commits_once() {
    let conn = RecordingConnection::new();
    conn.rows.set(1);
    let schema = entity::schema();

    let updated = run_in_transaction(&conn, |tx| -> Result<u64, WorkError> {
        schema.insert::<User>().set(user::AGE, 30).save(tx)?;
        Ok(schema
            .update::<User>()
            .filter(user::age_lt(18))
            .set(user::NICKNAME, "kid")
            .exec(tx)?)
    })
    .unwrap();

    assert_eq!(updated, 1);
    assert_eq!(conn.commits(), 1);
    assert_eq!(conn.rollbacks(), 0);
    let events = conn.events();
    assert_eq!(events.first(), Some(&Event::Begin(IsolationLevel::ReadCommitted)));
    assert_eq!(events.last(), Some(&Event::Commit));
    assert_eq!(events.len(), 4);
}

#[test]
fn test_failed_work_rolls_back_and_returns_its_error() {
    let conn = RecordingConnection::new();
    let result: Result<(), _> = run_in_transaction(&conn, |_tx| Err(WorkError("boom")));

    match result {
        Err(RunError::WorkFailed {
            source,
            rollback_error: None,
        }) => assert_eq!(source, WorkError("boom")),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(conn.commits(), 0);
    assert_eq!(conn.rollbacks(), 1);
}

#[test]
fn test_rollback_failure_does_not_mask_work_error() {
    let conn = RecordingConnection::new();
    conn.fail_rollback.set(true);
    let err = run_in_transaction(&conn, |_tx| -> Result<(), WorkError> {
        Err(WorkError("boom"))
    })
    .unwrap_err();

    assert_eq!(err.work_error(), Some(&WorkError("boom")));
    assert!(matches!(
        err,
        RunError::WorkFailed {
            rollback_error: Some(TransactionError::RollbackFailed(_)),
            ..
        }
    ));
    assert_eq!(conn.rollbacks(), 1);
    assert_eq!(conn.commits(), 0);
}

#[test]
fn test_statement_error_inside_work_rolls_back() {
    let conn = RecordingConnection::new();
    conn.fail_statements.set(true);
    let err = run_in_transaction(&conn, |tx| -> Result<(), WorkError> {
        user::query().filter(user::id_eq(1)).all(tx)?;
        Ok(())
    })
    .unwrap_err();

    assert_eq!(err.into_work_error(), Some(WorkError("statement failed")));
    assert_eq!(conn.rollbacks(), 1);
    assert_eq!(conn.commits(), 0);
}

#[test]
fn test_begin_failure_runs_no_work() {
    let conn = RecordingConnection::new();
    conn.fail_begin.set(true);
    let mut ran = false;
    let err = run_in_transaction(&conn, |_tx| -> Result<(), WorkError> {
        ran = true;
        Ok(())
    })
    .unwrap_err();

    assert!(!ran);
    assert!(matches!(
        err,
        RunError::Transaction(TransactionError::BeginFailed(_))
    ));
    assert_eq!(conn.commits(), 0);
    assert_eq!(conn.rollbacks(), 0);
}

#[test]
fn test_commit_failure_is_reported_without_rollback() {
    let conn = RecordingConnection::new();
    conn.fail_commit.set(true);
    let err = run_in_transaction(&conn, |_tx| -> Result<u8, WorkError> { Ok(1) }).unwrap_err();

    assert!(matches!(
        err,
        RunError::Transaction(TransactionError::CommitFailed(_))
    ));
    assert_eq!(conn.commits(), 1);
    assert_eq!(conn.rollbacks(), 0);
}

#[test]
fn test_panic_in_work_rolls_back() {
    let conn = RecordingConnection::new();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let _: Result<(), RunError<WorkError>> =
            run_in_transaction(&conn, |_tx| panic!("work panicked"));
    }));

    assert!(outcome.is_err());
    assert_eq!(conn.commits(), 0);
    assert_eq!(conn.rollbacks(), 1);
}

#[test]
fn test_isolation_level_reaches_begin() {
    let conn = RecordingConnection::new();
    run_in_transaction_with(&conn, IsolationLevel::Serializable, |_tx| {
        Ok::<_, WorkError>(())
    })
    .unwrap();
    assert_eq!(
        conn.events(),
        vec![Event::Begin(IsolationLevel::Serializable), Event::Commit]
    );
}

#[test]
fn test_work_that_commits_itself_is_reported() {
    let conn = RecordingConnection::new();
    let err = run_in_transaction(&conn, |tx| -> Result<(), WorkError> {
        tx.commit().map_err(|_| WorkError("commit"))
    })
    .unwrap_err();

    assert!(matches!(
        err,
        RunError::Transaction(TransactionError::TransactionClosed(
            TransactionState::Committed
        ))
    ));
    assert_eq!(conn.commits(), 1);
    assert_eq!(conn.rollbacks(), 0);
}

#[test]
fn test_dropped_transaction_rolls_back() {
    let conn = RecordingConnection::new();
    {
        let tx = Transaction::begin(&conn, IsolationLevel::RepeatableRead).unwrap();
        assert_eq!(tx.state(), TransactionState::Open);
        tx.execute("SELECT 1", &sea_query::Values(vec![])).unwrap();
    }
    assert_eq!(conn.rollbacks(), 1);
}

#[test]
fn test_closed_transaction_refuses_statements() {
    let conn = RecordingConnection::new();
    let tx = Transaction::begin(&conn, IsolationLevel::default()).unwrap();
    tx.rollback().unwrap();
    assert_eq!(tx.state(), TransactionState::RolledBack);
    assert!(tx.execute("SELECT 1", &sea_query::Values(vec![])).is_err());
    assert!(matches!(
        tx.commit(),
        Err(TransactionError::TransactionClosed(TransactionState::RolledBack))
    ));
    assert_eq!(conn.rollbacks(), 1);
    assert_eq!(conn.commits(), 0);
}
