use cpc_regions::catalog::new_names;
use cpc_regions::CatalogScheme;

/// Print the ID/name table of a catalog scheme.
pub fn run_names(scheme: CatalogScheme) -> anyhow::Result<()> {
    let names = new_names(scheme);
    print!("{}", names.render_table(Some(("ID", "NAME"))));
    Ok(())
}
