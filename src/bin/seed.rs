//! Seed script for development — creates local copies of the warehouse
//! tables and loads a small realistic sample.
//!
//! The real tables are owned by the upstream SAP import pipeline; this
//! script only exists so the dashboards and the ignored integration tests
//! have data to run against locally.
//!
//! Usage: `cargo run --bin seed` (reads `DATABASE_URL` from .env)

use sqlx::PgPool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    println!("=== sapdash seed script ===");

    create_warehouse_tables(&pool).await?;
    seed_materials(&pool).await?;
    seed_inventory(&pool).await?;
    seed_sales_detail(&pool).await?;
    seed_sales_orders(&pool).await?;

    println!("\n=== Seed complete! ===");

    Ok(())
}

/// Drop and recreate the four warehouse tables. Quantity/amount columns are
/// NUMERIC and date columns TEXT ('YYYY-MM-DD'), matching the shapes the
/// dashboard SQL expects from the SAP export.
async fn create_warehouse_tables(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query("DROP TABLE IF EXISTS sap_zmmr0016_inventory CASCADE")
        .execute(pool)
        .await?;
    sqlx::query(
        r#"
        CREATE TABLE sap_zmmr0016_inventory (
            id SERIAL PRIMARY KEY,
            "자재" TEXT NOT NULL,
            "자재명" TEXT,
            "제품군명" TEXT,
            "재고구분명" TEXT,
            "공급업체" TEXT,
            "재고금액" NUMERIC,
            "총재고수량" NUMERIC,
            "가용재고수량" NUMERIC,
            "가용재고금액" NUMERIC,
            "6개월평균판매금액" NUMERIC,
            "6개월평균판매수량" NUMERIC,
            "B등급" NUMERIC,
            "C등급" NUMERIC,
            "D등급" NUMERIC,
            "등급재고금액" NUMERIC,
            "LT3M(수량)" NUMERIC,
            "LT3M(금액)" NUMERIC,
            "LT6M(수량)" NUMERIC,
            "LT6M(금액)" NUMERIC,
            "LT12M(수량)" NUMERIC,
            "LT12M(금액)" NUMERIC,
            "LT24M(수량)" NUMERIC,
            "LT24M(금액)" NUMERIC,
            "MT24M(수량)" NUMERIC,
            "MT24M(금액)" NUMERIC,
            "위탁재고" NUMERIC,
            "CY재고" NUMERIC,
            "보류재고" NUMERIC,
            "생산재작업" NUMERIC
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("DROP TABLE IF EXISTS sap_zsdr0340_sales_detail CASCADE")
        .execute(pool)
        .await?;
    sqlx::query(
        r#"
        CREATE TABLE sap_zsdr0340_sales_detail (
            id SERIAL PRIMARY KEY,
            "청구일" TEXT NOT NULL,
            "청구금액" NUMERIC,
            "청구수량" NUMERIC,
            "대금청구문서" TEXT,
            "판매처" TEXT,
            "판매처명" TEXT,
            "판매처지역명" TEXT,
            "설계처명" TEXT,
            "자재" TEXT,
            "자재명" TEXT,
            "자재그룹6명" TEXT,
            "자재그룹7명" TEXT,
            "판가" NUMERIC,
            "매출할인" NUMERIC,
            "본사마진" NUMERIC,
            "오더TYPE" TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("DROP TABLE IF EXISTS sap_zsdr0062_sales_orders CASCADE")
        .execute(pool)
        .await?;
    sqlx::query(
        r#"
        CREATE TABLE sap_zsdr0062_sales_orders (
            id SERIAL PRIMARY KEY,
            "판매오더" TEXT NOT NULL,
            "고객명_판매처" TEXT,
            "자재" TEXT,
            "자재내역" TEXT,
            "제품군명" TEXT,
            "자재그룹5명" TEXT,
            "오더수량" NUMERIC,
            "출고수량" NUMERIC,
            "가용재고" NUMERIC,
            "납품가능수량" NUMERIC,
            "납품가능금액" NUMERIC,
            "공급금액" NUMERIC,
            "납기일_품목" TEXT,
            "납품우선순위" TEXT,
            "생산예정수량" NUMERIC,
            "생산예정일자" TEXT,
            "생산사유" TEXT,
            "CY창고수량" NUMERIC
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("DROP TABLE IF EXISTS sap_zmmr0001_materials CASCADE")
        .execute(pool)
        .await?;
    sqlx::query(
        r#"
        CREATE TABLE sap_zmmr0001_materials (
            id SERIAL PRIMARY KEY,
            "자재" TEXT NOT NULL,
            "자재그룹7명" TEXT,
            "판매단위" NUMERIC,
            "판가" NUMERIC,
            "단종여부" TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    println!("[done] Created warehouse tables");
    Ok(())
}

async fn seed_materials(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO sap_zmmr0001_materials ("자재", "자재그룹7명", "판매단위", "판가", "단종여부") VALUES
            ('MAT-1001', '케이블', 1, 12500, NULL),
            ('MAT-1002', '케이블', 1, 8300, NULL),
            ('MAT-1003', '커넥터', 10, 950, NULL),
            ('MAT-1004', '커넥터', 10, 1200, '1'),
            ('MAT-1005', '배전반', 1, 480000, NULL)
        "#,
    )
    .execute(pool)
    .await?;
    println!("[done] Seeded materials master");
    Ok(())
}

async fn seed_inventory(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO sap_zmmr0016_inventory (
            "자재", "자재명", "제품군명", "재고구분명", "공급업체",
            "재고금액", "총재고수량", "가용재고수량", "가용재고금액",
            "6개월평균판매금액", "6개월평균판매수량",
            "B등급", "C등급", "D등급", "등급재고금액",
            "LT3M(수량)", "LT3M(금액)", "LT6M(수량)", "LT6M(금액)",
            "LT12M(수량)", "LT12M(금액)", "LT24M(수량)", "LT24M(금액)",
            "MT24M(수량)", "MT24M(금액)",
            "위탁재고", "CY재고", "보류재고", "생산재작업"
        ) VALUES
            ('MAT-1001', '전력케이블 3C', '전력케이블', '정상', '서울전선',
             62500000, 5000, 4200, 52500000, 21000000, 1700,
             1500000, 800000, 200000, 2500000,
             3000, 37500000, 1200, 15000000, 600, 7500000, 200, 2500000, 0, 0,
             300, 150, 0, 0),
            ('MAT-1002', '통신케이블 UTP', '통신케이블', '정상', '대전케이블',
             24900000, 3000, 2600, 21580000, 6600000, 800,
             400000, 300000, 100000, 800000,
             1800, 14940000, 700, 5810000, 350, 2905000, 150, 1245000, 0, 0,
             0, 80, 20, 0),
            ('MAT-1003', '방수 커넥터', '커넥터', '정상', '부산부품',
             4750000, 5000, 4000, 3800000, 1900000, 2000,
             150000, 100000, 50000, 300000,
             2500, 2375000, 1200, 1140000, 800, 760000, 400, 380000, 100, 95000,
             0, 0, 0, 50),
            ('MAT-1004', '구형 커넥터', '커넥터', '불용', '부산부품',
             1200000, 1000, 1000, 0, 0, 0,
             0, 200000, 400000, 600000,
             0, 0, 0, 0, 0, 0, 200, 240000, 800, 960000,
             0, 0, 100, 0),
            ('MAT-1005', '수배전반 표준형', '배전반', '정상', '인천중공업',
             96000000, 200, 150, 72000000, 38400000, 80,
             4800000, 0, 0, 4800000,
             120, 57600000, 50, 24000000, 20, 9600000, 10, 4800000, 0, 0,
             10, 5, 0, 0)
        "#,
    )
    .execute(pool)
    .await?;
    println!("[done] Seeded inventory snapshot");
    Ok(())
}

async fn seed_sales_detail(pool: &PgPool) -> anyhow::Result<()> {
    // Billing dates are relative to CURRENT_DATE so the month/30-day windows
    // in the dashboard queries always match fresh rows.
    sqlx::query(
        r#"
        INSERT INTO sap_zsdr0340_sales_detail (
            "청구일", "청구금액", "청구수량", "대금청구문서",
            "판매처", "판매처명", "판매처지역명", "설계처명",
            "자재", "자재명", "자재그룹6명", "자재그룹7명",
            "판가", "매출할인", "본사마진", "오더TYPE"
        ) VALUES
            (TO_CHAR(CURRENT_DATE, 'YYYY-MM-DD'), 12500000, 1000, 'INV-9001',
             'C001', '한빛전기', '수도권', '대한설계',
             'MAT-1001', '전력케이블 3C', '케이블류', '케이블', 12500, 500, 1800, 'ZOR'),
            (TO_CHAR(CURRENT_DATE - INTERVAL '2 days', 'YYYY-MM-DD'), 8300000, 1000, 'INV-9002',
             'C002', '동서전력', '영남권', NULL,
             'MAT-1002', '통신케이블 UTP', '케이블류', '케이블', 8300, 300, 1200, 'ZOR'),
            (TO_CHAR(CURRENT_DATE - INTERVAL '5 days', 'YYYY-MM-DD'), 1900000, 2000, 'INV-9003',
             'C003', '남부산업', '호남권', '미래엔지니어링',
             'MAT-1003', '방수 커넥터', '부품류', '커넥터', 950, 50, 200, 'ZRE'),
            (TO_CHAR(CURRENT_DATE - INTERVAL '12 days', 'YYYY-MM-DD'), 48000000, 100, 'INV-9004',
             'C001', '한빛전기', '수도권', '대한설계',
             'MAT-1005', '수배전반 표준형', '장비류', '배전반', 480000, 20000, 60000, 'ZOR'),
            (TO_CHAR(CURRENT_DATE - INTERVAL '40 days', 'YYYY-MM-DD'), 25000000, 2000, 'INV-8001',
             'C002', '동서전력', '영남권', NULL,
             'MAT-1001', '전력케이블 3C', '케이블류', '케이블', 12500, 400, 1700, 'ZOR'),
            (TO_CHAR(CURRENT_DATE - INTERVAL '70 days', 'YYYY-MM-DD'), 16600000, 2000, 'INV-8002',
             'C004', '북부전설', '수도권', '미래엔지니어링',
             'MAT-1002', '통신케이블 UTP', '케이블류', '케이블', 8300, 250, 1100, 'ZOR'),
            (TO_CHAR(CURRENT_DATE - INTERVAL '100 days', 'YYYY-MM-DD'), 96000000, 200, 'INV-8003',
             'C001', '한빛전기', '수도권', '대한설계',
             'MAT-1005', '수배전반 표준형', '장비류', '배전반', 480000, 15000, 58000, 'ZOR'),
            (TO_CHAR(CURRENT_DATE - INTERVAL '130 days', 'YYYY-MM-DD'), 4750000, 5000, 'INV-8004',
             'C003', '남부산업', '호남권', NULL,
             'MAT-1003', '방수 커넥터', '부품류', '커넥터', 950, 40, 180, 'ZRE'),
            (TO_CHAR(CURRENT_DATE - INTERVAL '200 days', 'YYYY-MM-DD'), 37500000, 3000, 'INV-7001',
             'C002', '동서전력', '영남권', '대한설계',
             'MAT-1001', '전력케이블 3C', '케이블류', '케이블', 12500, 350, 1600, 'ZOR'),
            (TO_CHAR(CURRENT_DATE - INTERVAL '320 days', 'YYYY-MM-DD'), 24000000, 50, 'INV-7002',
             'C005', '중앙조선', '영남권', NULL,
             'MAT-1005', '수배전반 표준형', '장비류', '배전반', 480000, 10000, 55000, 'ZOR')
        "#,
    )
    .execute(pool)
    .await?;
    println!("[done] Seeded sales ledger");
    Ok(())
}

async fn seed_sales_orders(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO sap_zsdr0062_sales_orders (
            "판매오더", "고객명_판매처", "자재", "자재내역", "제품군명", "자재그룹5명",
            "오더수량", "출고수량", "가용재고", "납품가능수량", "납품가능금액", "공급금액",
            "납기일_품목", "납품우선순위", "생산예정수량", "생산예정일자", "생산사유", "CY창고수량"
        ) VALUES
            ('SO-5001', '한빛전기', 'MAT-1001', '전력케이블 3C', '전력케이블', '케이블',
             2000, 0, 1500, 1500, 18750000, 25000000,
             TO_CHAR(CURRENT_DATE - INTERVAL '1 day', 'YYYY-MM-DD'), '1', 800, TO_CHAR(CURRENT_DATE + INTERVAL '10 days', 'YYYY-MM-DD'), '원자재 입고 지연', 150),
            ('SO-5002', '동서전력', 'MAT-1002', '통신케이블 UTP', '통신케이블', '케이블',
             1500, 200, 900, 900, 7470000, 12450000,
             TO_CHAR(CURRENT_DATE + INTERVAL '2 days', 'YYYY-MM-DD'), '2', 600, TO_CHAR(CURRENT_DATE + INTERVAL '14 days', 'YYYY-MM-DD'), '생산능력 부족', 80),
            ('SO-5003', '남부산업', 'MAT-1003', '방수 커넥터', '커넥터', '부품',
             5000, 4000, 4000, 4000, 3800000, 4750000,
             TO_CHAR(CURRENT_DATE + INTERVAL '6 days', 'YYYY-MM-DD'), '3', NULL, NULL, NULL, 0),
            ('SO-5004', '북부전설', 'MAT-1005', '수배전반 표준형', '배전반', '장비',
             100, 0, 60, 60, 28800000, 48000000,
             TO_CHAR(CURRENT_DATE + INTERVAL '12 days', 'YYYY-MM-DD'), '1', 40, TO_CHAR(CURRENT_DATE + INTERVAL '25 days', 'YYYY-MM-DD'), '수주 증가', 5),
            ('SO-5005', '중앙조선', 'MAT-1001', '전력케이블 3C', '전력케이블', '케이블',
             1000, 1000, 1000, 1000, 12500000, 12500000,
             TO_CHAR(CURRENT_DATE + INTERVAL '20 days', 'YYYY-MM-DD'), '3', NULL, NULL, NULL, 0),
            ('SO-5006', '한빛전기', 'MAT-1002', '통신케이블 UTP', '통신케이블', '케이블',
             800, 0, 300, 300, 2490000, 6640000,
             TO_CHAR(CURRENT_DATE + INTERVAL '25 days', 'YYYY-MM-DD'), '2', 500, TO_CHAR(CURRENT_DATE + INTERVAL '18 days', 'YYYY-MM-DD'), '원자재 입고 지연', 120)
        "#,
    )
    .execute(pool)
    .await?;
    println!("[done] Seeded sales orders");
    Ok(())
}
