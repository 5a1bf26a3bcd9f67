use crate::{
    desc::Tile,
    kernels::lq,
    runtime::{Region, Task},
    scalar::ComplexField,
    Error, Request, Sequence, Side, Trans,
};
use dyn_stack::StackReq;

fn scratch<E: ComplexField>(side: Side, c: &Tile<E>) -> Result<StackReq, Error> {
    lq::unmlq_req::<E>(side, c.nrows(), c.ncols()).map_err(|_| Error::OutOfMemory)
}

/// Submits the LQ factorization of the tile `a`, storing the reflector scalars in `t`.
pub fn gelqt<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    ib: usize,
    a: Tile<E>,
    t: Tile<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    let task = Task::new("gelqt")
        .read_write(a.key())
        .read_write(t.key())
        .flops(lq::gelqt_flops::<E>(a.nrows(), a.ncols()));

    region.submit(seq, req, task, move |_| {
        unsafe { lq::gelqt(ib, a.as_mut(), t.as_mut()) };
        Ok(())
    });
}

/// Submits the LQ factorization of the pair `[a1, a2]`, where `a1` holds the lower triangular
/// factor of an earlier [`gelqt`].
pub fn tslqt<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    ib: usize,
    a1: Tile<E>,
    a2: Tile<E>,
    t: Tile<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    let task = Task::new("tslqt")
        .read_write(a1.key())
        .read_write(a2.key())
        .read_write(t.key())
        .flops(lq::tslqt_flops::<E>(a1.nrows(), a2.ncols()));

    region.submit(seq, req, task, move |_| {
        unsafe { lq::tslqt(ib, a1.as_mut(), a2.as_mut(), t.as_mut()) };
        Ok(())
    });
}

/// Submits the application of the unitary factor held by the diagonal tile `a` and its scalars
/// `t` to the tile `c`.
pub fn unmlq<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    side: Side,
    trans: Trans,
    ib: usize,
    a: Tile<E>,
    t: Tile<E>,
    c: Tile<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    let stack_req = match scratch(side, &c) {
        Ok(stack_req) => stack_req,
        Err(err) => {
            seq.fail(req, err);
            return;
        }
    };
    let k = Ord::min(a.nrows(), a.ncols());
    let task = Task::new("unmlq")
        .read(a.key())
        .read(t.key())
        .read_write(c.key())
        .scratch(stack_req)
        .flops(lq::unmlq_flops::<E>(c.nrows(), c.ncols(), k));

    region.submit(seq, req, task, move |stack| {
        unsafe { lq::unmlq(side, trans, ib, a.as_ref(), t.as_ref(), c.as_mut(), stack) };
        Ok(())
    });
}

/// Submits the application of the unitary factor computed by [`tslqt`], whose reflectors are held
/// by `v` and their scalars by `t`, to the pair `(c1, c2)`.
pub fn tsmlq<'env, E: ComplexField>(
    region: &Region<'_, 'env>,
    side: Side,
    trans: Trans,
    ib: usize,
    c1: Tile<E>,
    c2: Tile<E>,
    v: Tile<E>,
    t: Tile<E>,
    seq: &'env Sequence,
    req: &'env Request,
) {
    let stack_req = match scratch(side, &c1) {
        Ok(stack_req) => stack_req,
        Err(err) => {
            seq.fail(req, err);
            return;
        }
    };
    let (m, n) = match side {
        Side::Left => (c1.nrows() + c2.nrows(), c1.ncols()),
        Side::Right => (c1.nrows(), c1.ncols() + c2.ncols()),
    };
    let task = Task::new("tsmlq")
        .read_write(c1.key())
        .read_write(c2.key())
        .read(v.key())
        .read(t.key())
        .scratch(stack_req)
        .flops(lq::unmlq_flops::<E>(m, n, v.nrows()));

    region.submit(seq, req, task, move |stack| {
        unsafe {
            lq::tsmlq(
                side,
                trans,
                ib,
                c1.as_mut(),
                c2.as_mut(),
                v.as_ref(),
                t.as_ref(),
                stack,
            )
        };
        Ok(())
    });
}
