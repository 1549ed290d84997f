use approx::assert_relative_eq;
use half::f16;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spx_matrix::{
    CompressedMatrix, DynamicMatrix, Matrix, Scaled, StorageOrder, Structure, Transposed,
};
use spx_product::analysis::select_kernel;
use spx_product::{
    add_assign, assign, mul_assign, product, smp_add_assign, smp_assign, smp_sub_assign,
    sub_assign, Decision, KernelKind, ProductConfig, SymmetricOperand,
};

fn random_dense(rng: &mut StdRng, rows: usize, columns: usize) -> DynamicMatrix<i64> {
    DynamicMatrix::from_fn(rows, columns, |_, _| rng.gen_range(-9..=9))
}

fn random_sparse(
    rng: &mut StdRng,
    rows: usize,
    columns: usize,
    density: f64,
) -> CompressedMatrix<i64> {
    let mut triplets = Vec::new();
    for j in 0..columns {
        for i in 0..rows {
            if rng.gen_bool(density) {
                triplets.push((i, j, rng.gen_range(1..=9)));
            }
        }
    }
    CompressedMatrix::from_triplets(rows, columns, &triplets).unwrap()
}

fn reference(a: &DynamicMatrix<i64>, b: &CompressedMatrix<i64>) -> DynamicMatrix<i64> {
    a.matmul(&b.to_dense()).unwrap()
}

/// Zero the entries `structure` forbids and declare it.
fn shaped(m: DynamicMatrix<i64>, structure: Structure) -> DynamicMatrix<i64> {
    let n = m.rows();
    DynamicMatrix::from_fn(n, m.columns(), |i, j| {
        if structure.allows(i, j) {
            m.get(i, j)
        } else {
            0
        }
    })
    .with_structure(structure)
    .unwrap()
}

fn shaped_sparse(m: CompressedMatrix<i64>, structure: Structure) -> CompressedMatrix<i64> {
    let dense = m.to_dense();
    let filtered = DynamicMatrix::from_fn(dense.rows(), dense.columns(), |i, j| {
        if structure.allows(i, j) {
            dense.get(i, j)
        } else {
            0
        }
    });
    CompressedMatrix::from_dense(&filtered)
        .with_structure(structure)
        .unwrap()
}

fn symmetric_sparse(rng: &mut StdRng, n: usize) -> CompressedMatrix<i64> {
    let upper = random_sparse(rng, n, n, 0.3).to_dense();
    let sym = DynamicMatrix::from_fn(n, n, |i, j| upper.get(i.min(j), i.max(j)));
    CompressedMatrix::from_dense(&sym)
        .with_structure(Structure::symmetric())
        .unwrap()
}

// ============================================================
// Concrete scenarios
// ============================================================

#[test]
fn test_worked_example() {
    let a = DynamicMatrix::from_rows(&[[1, 2, 3], [4, 5, 6]]).unwrap();
    let b = CompressedMatrix::from_triplets(3, 2, &[(0, 0, 1), (1, 1, 2), (2, 0, 3)]).unwrap();
    let p = product(&a, &b).unwrap();

    let mut c = DynamicMatrix::zeros(2, 2);
    assign(&mut c, &p);
    assert_eq!(c, DynamicMatrix::from_rows(&[[10, 4], [22, 10]]).unwrap());

    let mut c = DynamicMatrix::from_rows(&[[1, 1], [1, 1]]).unwrap();
    add_assign(&mut c, &p);
    assert_eq!(c, DynamicMatrix::from_rows(&[[11, 5], [23, 11]]).unwrap());
}

#[test]
fn test_empty_column_clears_stale_values() {
    let a = DynamicMatrix::from_fn(6, 3, |i, j| (i + j + 1) as i64);
    let b = CompressedMatrix::from_triplets(3, 3, &[(0, 0, 1), (2, 2, 1)]).unwrap();
    for use_optimized in [false, true] {
        let config = ProductConfig::default().with_optimized_kernels(use_optimized);
        let p = product(&a, &b).unwrap().with_config(config);
        let mut c = DynamicMatrix::from_fn(6, 3, |_, _| 99);
        assign(&mut c, &p);
        for i in 0..6 {
            assert_eq!(c.get(i, 1), 0, "stale value in row {}", i);
        }
        assert_eq!(c, reference(&a, &b));
    }
}

#[test]
fn test_empty_operands() {
    let a = DynamicMatrix::<i64>::zeros(3, 0);
    let b = CompressedMatrix::<i64>::zeros(0, 4);
    let p = product(&a, &b).unwrap();
    let mut c = DynamicMatrix::from_fn(3, 4, |_, _| 5);
    assign(&mut c, &p);
    assert_eq!(c, DynamicMatrix::zeros(3, 4));
}

// ============================================================
// Random operands against the reference triple loop
// ============================================================

#[test]
fn test_general_against_reference() {
    let mut rng = StdRng::seed_from_u64(7);
    for &(m, k, n) in &[(1, 1, 1), (2, 3, 2), (5, 7, 3), (9, 4, 11), (17, 13, 6)] {
        let a = random_dense(&mut rng, m, k);
        let b = random_sparse(&mut rng, k, n, 0.4);
        let mut c = random_dense(&mut rng, m, n);
        assign(&mut c, &product(&a, &b).unwrap());
        assert_eq!(c, reference(&a, &b), "{}x{} * {}x{}", m, k, k, n);
    }
}

#[test]
fn test_default_and_optimized_agree() {
    let mut rng = StdRng::seed_from_u64(11);
    let a = random_dense(&mut rng, 13, 21);
    let b = random_sparse(&mut rng, 21, 9, 0.6);
    let fast = product(&a, &b).unwrap();
    let slow = product(&a, &b)
        .unwrap()
        .with_config(ProductConfig::default().with_optimized_kernels(false));
    assert!(ProductConfig::default().use_optimized_kernels);

    let start = random_dense(&mut rng, 13, 9);
    let (mut x, mut y) = (start.clone(), start.clone());
    assign(&mut x, &fast);
    assign(&mut y, &slow);
    assert_eq!(x, y);

    let (mut x, mut y) = (start.clone(), start.clone());
    add_assign(&mut x, &fast);
    add_assign(&mut y, &slow);
    assert_eq!(x, y);
    sub_assign(&mut x, &fast);
    sub_assign(&mut y, &slow);
    assert_eq!(x, start);
    assert_eq!(y, start);
}

#[test]
fn test_add_then_sub_restores() {
    let mut rng = StdRng::seed_from_u64(3);
    let a = random_dense(&mut rng, 10, 8);
    let b = random_sparse(&mut rng, 8, 7, 0.3);
    let p = product(&a, &b).unwrap();
    let start = random_dense(&mut rng, 10, 7).to_order(StorageOrder::ColumnMajor);
    let mut c = start.clone();
    add_assign(&mut c, &p);
    sub_assign(&mut c, &p);
    assert_eq!(c, start);
}

// ============================================================
// Structured operands
// ============================================================

#[test]
fn test_diagonal_operands() {
    let mut rng = StdRng::seed_from_u64(5);
    let d = shaped(random_dense(&mut rng, 6, 6), Structure::diagonal());
    let b = random_sparse(&mut rng, 6, 4, 0.5);
    let mut c = DynamicMatrix::zeros(6, 4);
    assign(&mut c, &product(&d, &b).unwrap());
    assert_eq!(c, reference(&d, &b));

    let a = random_dense(&mut rng, 3, 6);
    let e = shaped_sparse(random_sparse(&mut rng, 6, 6, 0.9), Structure::diagonal());
    let p = product(&a, &e).unwrap();
    assert!(p.config().use_optimized_kernels);
    assert_eq!(
        select_kernel(p.config(), e.structure(), false, false),
        KernelKind::Default
    );
    let mut c = DynamicMatrix::zeros(3, 6);
    assign(&mut c, &p);
    assert_eq!(c, reference(&a, &e));
}

#[test]
fn test_triangular_left_operands() {
    let mut rng = StdRng::seed_from_u64(13);
    let structures = [
        Structure::lower(),
        Structure::strictly_lower(),
        Structure::upper(),
        Structure::strictly_upper(),
    ];
    for structure in structures {
        // 11 rows cover 4-row groups, a 2-row group and a single row.
        let a = shaped(random_dense(&mut rng, 11, 11), structure);
        let b = random_sparse(&mut rng, 11, 5, 0.5);
        let expected = reference(&a, &b);
        for use_optimized in [false, true] {
            let config = ProductConfig::default().with_optimized_kernels(use_optimized);
            let p = product(&a, &b).unwrap().with_config(config);
            let mut c = random_dense(&mut rng, 11, 5);
            assign(&mut c, &p);
            assert_eq!(c, expected, "{} left, optimized={}", structure, use_optimized);

            let mut d = DynamicMatrix::zeros(11, 5);
            add_assign(&mut d, &p);
            assert_eq!(d, expected);
        }
    }
}

#[test]
fn test_triangular_right_element_access() {
    let mut rng = StdRng::seed_from_u64(17);
    for structure in [Structure::lower(), Structure::strictly_upper()] {
        let a = random_dense(&mut rng, 4, 7);
        let b = shaped_sparse(random_sparse(&mut rng, 7, 7, 0.7), structure);
        let p = product(&a, &b).unwrap();
        let expected = reference(&a, &b);
        for i in 0..4 {
            for j in 0..7 {
                assert_eq!(p.get(i, j), expected.get(i, j));
            }
        }
    }
}

#[test]
fn test_symmetric_right_operand() {
    let mut rng = StdRng::seed_from_u64(19);
    let a = random_dense(&mut rng, 9, 8);
    let b = symmetric_sparse(&mut rng, 8);
    let mut general = CompressedMatrix::from_sparse(&b);
    general.clear_structure();

    let mut rewritten = DynamicMatrix::from_fn(9, 8, |_, _| 1);
    let mut plain = DynamicMatrix::zeros(9, 8);
    assign(&mut rewritten, &product(&a, &b).unwrap());
    assign(&mut plain, &product(&a, &general).unwrap());
    assert_eq!(rewritten, plain);
    assert_eq!(rewritten, reference(&a, &b));

    add_assign(&mut rewritten, &product(&a, &b).unwrap());
    add_assign(&mut plain, &product(&a, &general).unwrap());
    assert_eq!(rewritten, plain);
}

#[test]
fn test_symmetric_left_operand() {
    let mut rng = StdRng::seed_from_u64(41);
    let upper = random_dense(&mut rng, 10, 10);
    let values = DynamicMatrix::from_fn(10, 10, |i, j| upper.get(i.min(j), i.max(j)));
    let a = values.clone().with_structure(Structure::symmetric()).unwrap();
    let b = random_sparse(&mut rng, 10, 7, 0.4);
    let lhs = product(&a, &b).unwrap();
    let rhs = product(&values, &b).unwrap();
    assert_eq!(
        Decision::analyze(&a, &b, lhs.config()).exploit_symmetry,
        Some(SymmetricOperand::Left)
    );
    assert_eq!(Decision::analyze(&values, &b, rhs.config()).exploit_symmetry, None);

    for order in [StorageOrder::RowMajor, StorageOrder::ColumnMajor] {
        let start = random_dense(&mut rng, 10, 7).to_order(order);
        let (mut rewritten, mut plain) = (start.clone(), start.clone());
        assign(&mut rewritten, &lhs);
        assign(&mut plain, &rhs);
        assert_eq!(rewritten, plain);
        assert_eq!(rewritten, reference(&a, &b));

        add_assign(&mut rewritten, &lhs);
        add_assign(&mut plain, &rhs);
        assert_eq!(rewritten, plain);
        sub_assign(&mut rewritten, &lhs);
        sub_assign(&mut plain, &rhs);
        assert_eq!(rewritten, plain);
    }

    let mut sparse = CompressedMatrix::zeros(10, 7);
    assign(&mut sparse, &lhs);
    assert_eq!(sparse.to_dense(), reference(&a, &b));
}

#[test]
fn test_triangular_left_symmetric_right() {
    let mut rng = StdRng::seed_from_u64(43);
    let structures = [
        Structure::lower(),
        Structure::strictly_lower(),
        Structure::upper(),
        Structure::strictly_upper(),
    ];
    let b = symmetric_sparse(&mut rng, 11);
    for structure in structures {
        let a = shaped(random_dense(&mut rng, 11, 11), structure);
        let p = product(&a, &b).unwrap();
        let expected = reference(&a, &b);
        for order in [StorageOrder::RowMajor, StorageOrder::ColumnMajor] {
            let mut c = random_dense(&mut rng, 11, 11).to_order(order);
            assign(&mut c, &p);
            assert_eq!(c, expected, "{} left, {:?} target", structure, order);

            let mut d = DynamicMatrix::zeros_with_order(11, 11, order);
            add_assign(&mut d, &p);
            assert_eq!(d, expected);
        }
    }
}

// ============================================================
// Targets and contexts
// ============================================================

#[test]
fn test_column_major_target_matches_row_major() {
    let mut rng = StdRng::seed_from_u64(23);
    // More than one column tile.
    let a = random_dense(&mut rng, 5, 12);
    let b = random_sparse(&mut rng, 12, 300, 0.1);
    let p = product(&a, &b).unwrap();
    let mut row = DynamicMatrix::zeros(5, 300);
    let mut col = DynamicMatrix::zeros_with_order(5, 300, StorageOrder::ColumnMajor);
    assign(&mut row, &p);
    assign(&mut col, &p);
    assert_eq!(row, col);
    assert_eq!(row, reference(&a, &b));
}

#[test]
fn test_sparse_target_matches_dense() {
    let mut rng = StdRng::seed_from_u64(29);
    let a = random_dense(&mut rng, 7, 6);
    let b = random_sparse(&mut rng, 6, 5, 0.4);
    let p = product(&a, &b).unwrap();

    let start = random_sparse(&mut rng, 7, 5, 0.3);
    let mut sparse = start.clone();
    let mut dense = start.to_dense();
    assign(&mut sparse, &p);
    assign(&mut dense, &p);
    assert_eq!(sparse.to_dense(), dense);

    add_assign(&mut sparse, &p);
    add_assign(&mut dense, &p);
    assert_eq!(sparse.to_dense(), dense);

    sub_assign(&mut sparse, &p);
    sub_assign(&mut dense, &p);
    assert_eq!(sparse.to_dense(), dense);
}

#[test]
fn test_parallel_matches_serial() {
    let mut rng = StdRng::seed_from_u64(31);
    let a = random_dense(&mut rng, 64, 20);
    let b = random_sparse(&mut rng, 20, 17, 0.3);
    let config = ProductConfig::default().with_smp_threshold(16);
    let p = product(&a, &b).unwrap().with_config(config);
    assert!(p.can_smp_assign());

    for order in [StorageOrder::RowMajor, StorageOrder::ColumnMajor] {
        let start = random_dense(&mut rng, 64, 17).to_order(order);
        let (mut serial, mut parallel) = (start.clone(), start.clone());
        assign(&mut serial, &p);
        smp_assign(&mut parallel, &p);
        assert_eq!(serial, parallel);

        smp_add_assign(&mut parallel, &p);
        add_assign(&mut serial, &p);
        assert_eq!(serial, parallel);

        smp_sub_assign(&mut parallel, &p);
        assert_eq!(parallel, reference(&a, &b));
    }

    let mut sparse = CompressedMatrix::zeros(64, 17);
    smp_assign(&mut sparse, &p);
    assert_eq!(sparse.to_dense(), reference(&a, &b));
}

#[test]
fn test_parallel_symmetric() {
    let mut rng = StdRng::seed_from_u64(37);
    let a = random_dense(&mut rng, 40, 10);
    let b = symmetric_sparse(&mut rng, 10);
    let config = ProductConfig::default().with_smp_threshold(8);
    let p = product(&a, &b).unwrap().with_config(config);
    let mut c = DynamicMatrix::zeros_with_order(40, 10, StorageOrder::ColumnMajor);
    smp_assign(&mut c, &p);
    assert_eq!(c, reference(&a, &b));
}

#[test]
fn test_parallel_symmetric_left() {
    let mut rng = StdRng::seed_from_u64(47);
    let upper = random_dense(&mut rng, 36, 36);
    let a = DynamicMatrix::from_fn(36, 36, |i, j| upper.get(i.min(j), i.max(j)))
        .with_structure(Structure::symmetric())
        .unwrap();
    let b = random_sparse(&mut rng, 36, 9, 0.3);
    let config = ProductConfig::default().with_smp_threshold(8);
    let p = product(&a, &b).unwrap().with_config(config);
    assert!(p.can_smp_assign());
    for order in [StorageOrder::RowMajor, StorageOrder::ColumnMajor] {
        let mut c = DynamicMatrix::zeros_with_order(36, 9, order);
        smp_assign(&mut c, &p);
        assert_eq!(c, reference(&a, &b));
    }
}

// ============================================================
// Operands that need evaluation
// ============================================================

#[test]
fn test_transposed_operand_is_materialized() {
    let mut rng = StdRng::seed_from_u64(53);
    let a = random_dense(&mut rng, 30, 9);
    let bt = random_sparse(&mut rng, 6, 9, 0.4);
    let dense_bt = bt.to_dense();
    let b = DynamicMatrix::from_fn(9, 6, |i, j| dense_bt.get(j, i));
    let expected = a.matmul(&b).unwrap();

    let config = ProductConfig::default().with_smp_threshold(4);
    let p = product(&a, Transposed::new(&bt)).unwrap().with_config(config);
    assert!(!p.right_operand().is_computation());
    assert!(p.right_operand().requires_evaluation());
    assert!(!p.smp_assignable());
    assert!(!p.can_smp_assign());

    let mut c = DynamicMatrix::from_fn(30, 6, |_, _| 4);
    assign(&mut c, &p);
    assert_eq!(c, expected);

    let mut d = DynamicMatrix::zeros_with_order(30, 6, StorageOrder::ColumnMajor);
    smp_assign(&mut d, &p);
    assert_eq!(d, expected);
    smp_add_assign(&mut d, &p);
    smp_sub_assign(&mut d, &p);
    assert_eq!(d, expected);
}

#[test]
fn test_scaled_operands() {
    let mut rng = StdRng::seed_from_u64(41);
    let a = random_dense(&mut rng, 8, 6);
    let b = random_sparse(&mut rng, 6, 5, 0.5);
    let sa = Scaled::new(&a, 3);
    let sb = Scaled::new(&b, -2);
    let ea = DynamicMatrix::from_matrix(&sa);
    let eb = CompressedMatrix::from_sparse(&sb);

    let lazy = product(&sa, &sb).unwrap();
    assert!(!lazy.smp_assignable());
    let mut c = DynamicMatrix::zeros(8, 5);
    assign(&mut c, &lazy);
    assert_eq!(c, reference(&ea, &eb));

    let config = ProductConfig::default().with_smp_threshold(0);
    let mut d = DynamicMatrix::zeros(8, 5);
    smp_assign(&mut d, &product(&sa, &sb).unwrap().with_config(config));
    assert_eq!(c, d);
}

#[test]
fn test_nested_product_operand() {
    let mut rng = StdRng::seed_from_u64(43);
    let a = random_dense(&mut rng, 5, 4);
    let b = random_sparse(&mut rng, 4, 6, 0.5);
    let c = random_sparse(&mut rng, 6, 3, 0.5);

    let inner = product(&a, &b).unwrap();
    let ab = inner.evaluate();
    let outer = product(inner, &c).unwrap();
    assert!(outer.left_operand().is_computation());

    let mut out = DynamicMatrix::zeros(5, 3);
    assign(&mut out, &outer);
    assert_eq!(out, reference(&ab, &c));
    assert_eq!(outer.evaluate(), out);
}

#[test]
fn test_mul_assign_matches_reference() {
    let mut rng = StdRng::seed_from_u64(47);
    let a = random_dense(&mut rng, 4, 4);
    let b = random_sparse(&mut rng, 4, 4, 0.5);
    let p = product(&a, &b).unwrap();
    let start = random_dense(&mut rng, 3, 4);

    let mut c = start.clone();
    mul_assign(&mut c, &p).unwrap();
    assert_eq!(c, start.matmul(&reference(&a, &b)).unwrap());
}

// ============================================================
// Vector products and float elements
// ============================================================

#[test]
fn test_vector_products_match_evaluated() {
    let a = DynamicMatrix::from_fn(4, 5, |i, j| (i as f64) * 0.5 - (j as f64) * 0.25);
    let b = CompressedMatrix::from_dense(&DynamicMatrix::from_fn(5, 3, |i, j| {
        if (i + j) % 2 == 0 {
            (i + 2 * j) as f64 * 0.1
        } else {
            0.0
        }
    }));
    let p = product(&a, &b).unwrap();
    let full = p.evaluate();

    let x = [1.0, -2.0, 0.5];
    let y = p.mul_vector(&x).unwrap();
    for i in 0..4 {
        let expected: f64 = (0..3).map(|j| full.get(i, j) * x[j]).sum();
        assert_relative_eq!(y[i], expected, epsilon = 1e-12);
    }

    let v = [0.25, 1.0, -1.0, 2.0];
    let z = p.vector_mul(&v).unwrap();
    for j in 0..3 {
        let expected: f64 = (0..4).map(|i| v[i] * full.get(i, j)).sum();
        assert_relative_eq!(z[j], expected, epsilon = 1e-12);
    }
}

#[test]
fn test_float_elements() {
    let a = DynamicMatrix::from_rows(&[[1.5f32, -2.0], [0.25, 4.0]]).unwrap();
    let b = CompressedMatrix::from_triplets(2, 2, &[(0, 0, 2.0f32), (1, 0, 0.5), (1, 1, -1.0)])
        .unwrap();
    let mut c = DynamicMatrix::zeros(2, 2);
    assign(&mut c, &product(&a, &b).unwrap());
    assert_relative_eq!(c.get(0, 0), 2.0);
    assert_relative_eq!(c.get(0, 1), 2.0);
    assert_relative_eq!(c.get(1, 0), 2.5);
    assert_relative_eq!(c.get(1, 1), -4.0);

    let h = DynamicMatrix::from_rows(&[[f16::from_f32(1.0), f16::from_f32(2.0)]]).unwrap();
    let hb = CompressedMatrix::from_triplets(2, 1, &[(1, 0, f16::from_f32(3.0))]).unwrap();
    let mut hc = DynamicMatrix::zeros(1, 1);
    assign(&mut hc, &product(&h, &hb).unwrap());
    assert_eq!(hc.get(0, 0).to_f32(), 6.0);
}
