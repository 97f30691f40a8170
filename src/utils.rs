use burn::tensor::{backend::Backend, Bool, Data, Int, Shape, Tensor};

pub fn bool_and<B: Backend, const D: usize>(
    a: Tensor<B, D, Bool>,
    b: Tensor<B, D, Bool>,
) -> Tensor<B, D, Bool> {
    (a.float() * b.float()).greater_elem(0.0)
}

pub fn bool_or<B: Backend, const D: usize>(
    a: Tensor<B, D, Bool>,
    b: Tensor<B, D, Bool>,
) -> Tensor<B, D, Bool> {
    (a.float() + b.float()).greater_elem(0.0)
}

/// True where `indices` holds one of `ids` and `mask` is set. An empty `ids`
/// yields an all-false tensor.
pub fn masked_idx_in_set<B: Backend>(
    indices: Tensor<B, 2, Int>, // [N, T]
    ids: &[i64],
    mask: Tensor<B, 2, Bool>, // [N, T]
) -> Tensor<B, 2, Bool> {
    let hits = ids.iter().fold(mask.clone().float().zeros_like(), |acc, &id| {
        acc + indices.clone().equal_elem(id).float()
    });

    bool_and(hits.greater_elem(0.0), mask)
}

/// Running sum along the step axis, as a product with an upper-triangular
/// matrix of ones. The matrix is `T x T`: memory grows with the square of
/// the generated length.
pub fn cumulative_sum<B: Backend>(x: Tensor<B, 2>) -> Tensor<B, 2> {
    let [_, steps] = x.dims();

    let triangle: Vec<f32> = (0..steps)
        .flat_map(|row| (0..steps).map(move |col| if row <= col { 1.0 } else { 0.0 }))
        .collect();
    let triangle: Tensor<B, 2> =
        Tensor::from_data(Data::new(triangle, Shape::new([steps, steps])).convert());

    x.matmul(triangle)
}

/// `[N, T]` tensor whose every row is `0, 1, .., T - 1`.
pub fn step_positions<B: Backend>(batch_size: usize, steps: usize) -> Tensor<B, 2> {
    let positions: Vec<f32> = (0..batch_size)
        .flat_map(|_| (0..steps).map(|t| t as f32))
        .collect();

    Tensor::from_data(Data::new(positions, Shape::new([batch_size, steps])).convert())
}

pub fn any_dim1<B: Backend>(x: Tensor<B, 2, Bool>) -> Tensor<B, 1, Bool> {
    let count: Tensor<B, 1> = x.float().sum_dim(1).squeeze(1);
    count.greater_elem(0.0)
}

pub fn none_dim1<B: Backend>(x: Tensor<B, 2, Bool>) -> Tensor<B, 1, Bool> {
    let count: Tensor<B, 1> = x.float().sum_dim(1).squeeze(1);
    count.equal_elem(0.0)
}

/// Index of the first set step of each row. Rows flagged in `none` get their
/// `sentinel` instead.
pub fn first_true_index<B: Backend>(
    x: Tensor<B, 2, Bool>,    // [N, T]
    none: Tensor<B, 1, Bool>, // [N]
    sentinel: Tensor<B, 1>,   // [N]
) -> Tensor<B, 1> {
    let [batch_size, steps] = x.dims();

    let first: Tensor<B, 2> = step_positions(batch_size, steps)
        .mask_fill(x.bool_not(), steps as f32)
        .min_dim(1);
    let first: Tensor<B, 1> = first.squeeze(1);

    first.mask_where(none, sentinel)
}
