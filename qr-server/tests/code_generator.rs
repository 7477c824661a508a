//! Code generator tests: collision avoidance against a populated collection
//! and the bounded-retry exhaustion path.

use std::collections::HashSet;
use std::sync::Arc;

use qr_server::core::AppError;
use qr_server::db;
use qr_server::db::models::QrCode;
use qr_server::db::repository::QrRepository;
use qr_server::services::CodeGenerator;
use qr_server::services::code_generator::CODE_ALPHABET;
use qr_server::store::KeyStore;

async fn seed_qr_with_code(store: &Arc<dyn KeyStore>, code: &str) {
    QrRepository::new(store.clone())
        .save(&QrCode::new(
            code.to_string(),
            "maker@qr.test".to_string(),
            "https://qr.example.com".to_string(),
            100.0,
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn ten_thousand_draws_never_return_an_existing_code() {
    let store: Arc<dyn KeyStore> = Arc::new(db::open_memory_store());

    // populate the collection with a spread of taken codes
    let seeded: Vec<String> = CodeGenerator::new(store.clone())
        .generate_many(500)
        .await
        .unwrap();
    for code in &seeded {
        seed_qr_with_code(&store, code).await;
    }
    let taken: HashSet<&String> = seeded.iter().collect();

    let generator = CodeGenerator::new(store.clone());
    for _ in 0..10_000 {
        let code = generator.generate().await.unwrap();
        assert!(!taken.contains(&code));
        assert_eq!(code.len(), 4);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }
}

#[tokio::test]
async fn a_full_code_space_exhausts_with_an_explicit_error() {
    let store: Arc<dyn KeyStore> = Arc::new(db::open_memory_store());
    // length-1 codes: the whole space is the 36-symbol alphabet
    for symbol in CODE_ALPHABET {
        seed_qr_with_code(&store, &(*symbol as char).to_string()).await;
    }

    let generator = CodeGenerator::new(store.clone())
        .with_length(1)
        .with_max_attempts(2_000);
    let err = generator.generate().await.unwrap_err();
    assert!(matches!(err, AppError::CodeSpaceExhausted { attempts: 2_000 }));
}

#[tokio::test]
async fn batch_generation_contains_no_intra_batch_duplicates() {
    let store: Arc<dyn KeyStore> = Arc::new(db::open_memory_store());

    // a 2-symbol space (1296 codes) makes in-batch collisions likely
    let codes = CodeGenerator::new(store.clone())
        .with_length(2)
        .generate_many(400)
        .await
        .unwrap();
    let unique: HashSet<&String> = codes.iter().collect();
    assert_eq!(unique.len(), 400);
}
