//! # Print Flow Tests
//!
//! Drives [`PrinterConnection`] through selection, discovery, transfer and
//! recovery against the in-memory BLE host.

use pretty_assertions::assert_eq;
use struk::format::{self, ReceiptLayout};
use struk::transport::mock::{
    MockHost, MockPrinter, MockProbe, OEM_WRITE_CHARACTERISTIC, VENDOR_WRITE_CHARACTERISTIC,
};
use struk::transport::selection::default_strategies;
use struk::transport::{ConnectionState, TransportConfig};
use struk::{MAX_CHUNK_BYTES, PrintError, PrinterConnection, ReceiptData, StrukError};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn connection(printers: Vec<MockPrinter>) -> (PrinterConnection<MockHost>, MockProbe) {
    let host = MockHost::new(printers);
    let probe = host.probe();
    (PrinterConnection::new(host), probe)
}

fn sample_bytes() -> Vec<u8> {
    format::format(&ReceiptData::sample())
}

fn sample_chunks() -> usize {
    sample_bytes().len().div_ceil(MAX_CHUNK_BYTES)
}

// ============================================================================
// HAPPY PATH
// ============================================================================

#[tokio::test]
async fn test_print_binds_and_sends_receipt() {
    let (mut printer, probe) = connection(vec![MockPrinter::vendor("RPP02N")]);

    printer.print(&ReceiptData::sample()).await.unwrap();

    assert_eq!(printer.state(), ConnectionState::Bound);
    assert_eq!(
        printer.bound_characteristic().map(|c| c.uuid),
        Some(VENDOR_WRITE_CHARACTERISTIC)
    );
    assert_eq!(probe.written(), sample_bytes());
    assert_eq!(probe.selection_requests(), 1);
    assert_eq!(printer.discoveries(), 1);
}

#[tokio::test]
async fn test_writes_respect_chunk_size() {
    let (mut printer, probe) = connection(vec![MockPrinter::vendor("RPP02N")]);

    printer.print(&ReceiptData::sample()).await.unwrap();

    let writes = probe.writes();
    assert_eq!(writes.len(), sample_chunks());
    assert!(writes.iter().all(|w| !w.is_empty() && w.len() <= MAX_CHUNK_BYTES));
    let (last, full) = writes.split_last().unwrap();
    assert!(full.iter().all(|w| w.len() == MAX_CHUNK_BYTES));
    assert_eq!(last.len(), sample_bytes().len() - full.len() * MAX_CHUNK_BYTES);
}

#[tokio::test]
async fn test_second_print_reuses_binding() {
    let (mut printer, probe) = connection(vec![MockPrinter::vendor("RPP02N")]);

    printer.print(&ReceiptData::sample()).await.unwrap();
    printer.print(&ReceiptData::sample()).await.unwrap();

    assert_eq!(probe.selection_requests(), 1);
    assert_eq!(probe.connects(), 1);
    assert_eq!(printer.discoveries(), 1);
    assert_eq!(probe.written(), [sample_bytes(), sample_bytes()].concat());
}

#[tokio::test]
async fn test_connect_when_bound_is_noop() {
    let (mut printer, probe) = connection(vec![MockPrinter::vendor("RPP02N")]);

    printer.connect().await.unwrap();
    printer.connect().await.unwrap();

    assert_eq!(printer.state(), ConnectionState::Bound);
    assert_eq!(probe.connects(), 1);
    assert!(probe.writes().is_empty());
}

#[tokio::test]
async fn test_larger_chunks() {
    let host = MockHost::new(vec![MockPrinter::vendor("RPP02N")]);
    let probe = host.probe();
    let config = TransportConfig {
        max_chunk_bytes: 182,
        ..TransportConfig::default()
    };
    let mut printer =
        PrinterConnection::with_config(host, config, ReceiptLayout::default()).unwrap();

    printer.print(&ReceiptData::sample()).await.unwrap();

    assert_eq!(probe.writes().len(), sample_bytes().len().div_ceil(182));
    assert_eq!(probe.written(), sample_bytes());
}

#[tokio::test]
async fn test_invalid_chunk_size_rejected_up_front() {
    for max_chunk_bytes in [0, 513] {
        let config = TransportConfig {
            max_chunk_bytes,
            ..TransportConfig::default()
        };
        let result = PrinterConnection::with_config(
            MockHost::new(vec![MockPrinter::vendor("RPP02N")]),
            config,
            ReceiptLayout::default(),
        );
        assert!(
            matches!(result, Err(StrukError::Config(_))),
            "chunk size {}",
            max_chunk_bytes
        );
    }
}

// ============================================================================
// SELECTION AND DISCOVERY
// ============================================================================

#[tokio::test]
async fn test_no_bluetooth() {
    let host = MockHost::unavailable();
    let probe = host.probe();
    let mut printer = PrinterConnection::new(host);

    let err = printer.print(&ReceiptData::sample()).await.unwrap_err();

    assert!(matches!(err, PrintError::CapabilityUnavailable));
    assert!(!err.is_retryable());
    assert_eq!(probe.selection_requests(), 0);
    assert_eq!(printer.discoveries(), 0);
    assert_eq!(printer.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_connect_without_bluetooth_skips_selection() {
    let host = MockHost::unavailable();
    let probe = host.probe();
    let mut printer = PrinterConnection::new(host);

    assert!(matches!(
        printer.connect().await,
        Err(PrintError::CapabilityUnavailable)
    ));
    assert_eq!(probe.selection_requests(), 0);
}

#[tokio::test]
async fn test_fallback_to_accept_all() {
    let (mut printer, probe) = connection(vec![MockPrinter::oem("MTP-II")]);

    printer.print(&ReceiptData::sample()).await.unwrap();

    assert_eq!(probe.strategies(), default_strategies());
    assert_eq!(
        printer.bound_characteristic().map(|c| c.uuid),
        Some(OEM_WRITE_CHARACTERISTIC)
    );
    assert_eq!(probe.written(), sample_bytes());
}

#[tokio::test]
async fn test_no_writable_characteristic() {
    let (mut printer, probe) = connection(vec![MockPrinter::read_only("BeaconX")]);

    let err = printer.print(&ReceiptData::sample()).await.unwrap_err();

    assert!(matches!(err, PrintError::NoWritableCharacteristic));
    assert_eq!(printer.state(), ConnectionState::Disconnected);
    assert!(printer.bound_characteristic().is_none());
    assert_eq!(probe.disconnects(), 1);
    assert!(probe.writes().is_empty());
}

#[tokio::test]
async fn test_selection_cancelled() {
    let host = MockHost::new(vec![MockPrinter::vendor("RPP02N")]).cancelling();
    let probe = host.probe();
    let mut printer = PrinterConnection::new(host);

    let err = printer.print(&ReceiptData::sample()).await.unwrap_err();

    assert!(matches!(err, PrintError::SelectionCancelled));
    assert!(err.is_cancellation());
    // cancellation stops the strategy list
    assert_eq!(probe.selection_requests(), 1);
    assert_eq!(printer.state(), ConnectionState::Disconnected);
    assert!(probe.writes().is_empty());
}

#[tokio::test]
async fn test_no_device_found() {
    let (mut printer, probe) = connection(Vec::new());

    let err = printer.print(&ReceiptData::sample()).await.unwrap_err();

    assert!(matches!(err, PrintError::NoDeviceFound));
    assert!(err.is_retryable());
    assert_eq!(probe.selection_requests(), default_strategies().len());
    assert_eq!(printer.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_platform_selection_error_is_reported() {
    let host = MockHost::new(vec![MockPrinter::vendor("RPP02N")])
        .failing_selection("org.bluez.Error.NotReady: adapter powered off");
    let probe = host.probe();
    let mut printer = PrinterConnection::new(host);

    let err = printer.print(&ReceiptData::sample()).await.unwrap_err();

    match &err {
        PrintError::SelectionFailed(reason) => assert!(reason.contains("NotReady"), "{}", reason),
        other => panic!("expected SelectionFailed, got {:?}", other),
    }
    assert_eq!(err.kind(), "selection_failed");
    assert_ne!(err.user_message(), PrintError::NoDeviceFound.user_message());
    assert_eq!(probe.selection_requests(), default_strategies().len());
    assert_eq!(printer.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_connect_failure() {
    let (mut printer, probe) = connection(vec![MockPrinter::vendor("RPP02N").failing_connect()]);

    let err = printer.print(&ReceiptData::sample()).await.unwrap_err();

    assert!(matches!(err, PrintError::ConnectFailed(_)));
    assert_eq!(printer.state(), ConnectionState::Disconnected);
    assert_eq!(probe.connects(), 0);
}

// ============================================================================
// TRANSFER FAILURE AND RECOVERY
// ============================================================================

async fn fail_at_chunk(k: usize) {
    let (mut printer, probe) = connection(vec![MockPrinter::vendor("RPP02N")]);
    let total = sample_chunks();

    probe.fail_write(k);
    let err = printer.print(&ReceiptData::sample()).await.unwrap_err();

    match err {
        PrintError::TransferFailed { chunk, total: t, .. } => {
            assert_eq!((chunk, t), (k, total), "failing chunk {}", k);
        }
        other => panic!("expected TransferFailed, got {:?}", other),
    }
    assert_eq!(printer.state(), ConnectionState::Disconnected);
    assert!(printer.bound_characteristic().is_none());
    assert_eq!(probe.disconnects(), 1);
    // no automatic retry: only the chunks before the failure went out
    assert_eq!(probe.writes().len(), k - 1);

    probe.clear_writes();
    printer.print(&ReceiptData::sample()).await.unwrap();

    assert_eq!(printer.discoveries(), 2);
    assert_eq!(probe.selection_requests(), 2);
    assert_eq!(probe.written(), sample_bytes());
}

#[tokio::test]
async fn test_write_failure_first_chunk() {
    fail_at_chunk(1).await;
}

#[tokio::test]
async fn test_write_failure_middle_chunk() {
    fail_at_chunk(sample_chunks() / 2).await;
}

#[tokio::test]
async fn test_write_failure_last_chunk() {
    fail_at_chunk(sample_chunks()).await;
}

#[tokio::test]
async fn test_reset_forces_rediscovery() {
    let (mut printer, probe) = connection(vec![MockPrinter::vendor("RPP02N")]);

    printer.print(&ReceiptData::sample()).await.unwrap();
    printer.reset().await;

    assert_eq!(printer.state(), ConnectionState::Disconnected);
    assert_eq!(probe.disconnects(), 1);

    printer.print(&ReceiptData::sample()).await.unwrap();
    assert_eq!(printer.discoveries(), 2);
    assert_eq!(probe.connects(), 2);
}
