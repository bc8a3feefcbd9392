// tests/upload_tests.rs

mod common;

use common::pdf_with_pages;
use quizify::{
    config::UploadLimits,
    services::upload::{
        UploadBuffer, UploadError, UploadedFile, check_content_type, check_size, count_pages,
        validate_upload,
    },
};

fn pdf_file(bytes: Vec<u8>) -> UploadedFile {
    UploadedFile {
        file_name: Some("notes.pdf".to_string()),
        content_type: "application/pdf".to_string(),
        bytes,
    }
}

#[test]
fn content_type_must_be_pdf() {
    assert!(check_content_type("application/pdf").is_ok());
    assert!(check_content_type("Application/PDF").is_ok());
    assert!(check_content_type("application/pdf; name=notes.pdf").is_ok());

    assert_eq!(
        check_content_type("image/png"),
        Err(UploadError::NotPdf {
            content_type: "image/png".to_string()
        })
    );
    assert!(check_content_type("").is_err());
}

#[test]
fn size_is_checked_against_the_ceiling() {
    let limits = UploadLimits {
        max_upload_mb: 2,
        ..UploadLimits::default()
    };

    assert_eq!(check_size(0, &limits), Err(UploadError::Empty));
    assert!(check_size(1, &limits).is_ok());
    assert!(check_size(2 * 1024 * 1024, &limits).is_ok());
    assert_eq!(
        check_size(2 * 1024 * 1024 + 1, &limits),
        Err(UploadError::TooLarge { limit_mb: 2 })
    );
}

#[test]
fn pages_are_counted() {
    assert_eq!(count_pages(&pdf_with_pages(1)), Ok(1));
    assert_eq!(count_pages(&pdf_with_pages(7)), Ok(7));
    assert!(matches!(
        count_pages(b"%PDF-1.4 garbage"),
        Err(UploadError::Unreadable(_))
    ));
}

#[test]
fn document_without_pages_is_unreadable() {
    assert!(matches!(
        count_pages(&pdf_with_pages(0)),
        Err(UploadError::Unreadable(_))
    ));
}

#[test]
fn valid_upload_passes() {
    let limits = UploadLimits::default();

    let pdf = validate_upload(pdf_file(pdf_with_pages(4)), &limits).unwrap();

    assert_eq!(pdf.page_count, 4);
    assert_eq!(pdf.file_name.as_deref(), Some("notes.pdf"));
    assert!(pdf.bytes.starts_with(b"%PDF"));
}

#[test]
fn page_limit_is_inclusive() {
    let limits = UploadLimits {
        max_pages: 3,
        ..UploadLimits::default()
    };

    assert!(validate_upload(pdf_file(pdf_with_pages(3)), &limits).is_ok());
    assert_eq!(
        validate_upload(pdf_file(pdf_with_pages(4)), &limits).unwrap_err(),
        UploadError::TooManyPages { pages: 4, limit: 3 }
    );
}

#[test]
fn type_is_checked_before_content() {
    let file = UploadedFile {
        file_name: None,
        content_type: "text/plain".to_string(),
        bytes: Vec::new(),
    };

    assert!(matches!(
        validate_upload(file, &UploadLimits::default()),
        Err(UploadError::NotPdf { .. })
    ));
}

#[test]
fn empty_pdf_is_rejected() {
    assert_eq!(
        validate_upload(pdf_file(Vec::new()), &UploadLimits::default()).unwrap_err(),
        UploadError::Empty
    );
}

#[test]
fn buffer_stops_at_the_ceiling() {
    let limits = UploadLimits {
        max_upload_mb: 1,
        ..UploadLimits::default()
    };
    let mut buffer = UploadBuffer::new(&limits);
    assert!(buffer.is_empty());

    let chunk = vec![0u8; 512 * 1024];
    buffer.push(&chunk).unwrap();
    buffer.push(&chunk).unwrap();
    assert_eq!(buffer.len(), 1024 * 1024);

    assert_eq!(buffer.push(&[0u8]), Err(UploadError::TooLarge { limit_mb: 1 }));
    assert_eq!(buffer.into_bytes().len(), 1024 * 1024);
}
