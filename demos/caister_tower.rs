use ostn15::{errors::StoreError, GridNode, GridStore, Lattice, ShiftInterpolator};

///
/// Builds a small store around Caister Tower, saves and reloads it, then interpolates the
/// shift at the tower. Only node (651, 313) is published data; the others are made up.
///
fn main() -> Result<(), StoreError>
{
    let store = GridStore::from_nodes(Lattice::OSTN15, [
        GridNode::new(651, 313, (102.787, -78.242, 44.236)),
        GridNode::new(652, 313, (102.791, -78.240, 44.229)),
        GridNode::new(651, 314, (102.784, -78.251, 44.241)),
        GridNode::new(652, 314, (102.789, -78.249, 44.233)),
    ])?;

    let path = std::env::temp_dir().join("caister_tower.grid");
    store.save(&path)?;
    let store = GridStore::open(&path)?;
    std::fs::remove_file(&path)?;

    let interpolator = ShiftInterpolator::new(&store);
    println!("node (651, 313): {:?}", interpolator.node_shift(651, 313));

    // ETRS89 easting and northing of Caister Tower
    let (e, n) = (651307.003, 313255.686);
    match interpolator.get_shift(e, n)
    {
        Ok(shift) => println!("shift at ({e}, {n}): {shift:?}, OSGB36 ({:.3}, {:.3})", e + shift.dx, n + shift.dy),
        Err(err) => println!("{err}"),
    }
    // outside the four nodes above
    println!("{:?}", interpolator.get_shift(400_000.0, 400_000.0));
    Ok(())
}
