#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("cabinet_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use cabinet_engine::drawing::{DEFAULT_MARGIN, ViewKind, ViewportSize, record_view};
    use cabinet_engine::export::texture::EXPORT_TEXTURE_CAP;
    use cabinet_engine::export::{ExportBackend, GlbBackend, build_export_scene, glb};
    use cabinet_engine::model::{
        CabinetPlacement, ConfiguratorState, DimensionParameters, LengthUnit, MaterialKind, PanelShape,
        ReferencePlane, derive_geometry, units,
    };
    use std::fmt::Write as _;
    use std::fs;
    use std::path::{Path, PathBuf};

    const USAGE: &str = r#"cabinet_cli (cabinet-engine)

USAGE:
  cabinet_cli panels [dimensions]
  cabinet_cli views [dimensions] [--view <name>] [--size <WxH>]
  cabinet_cli export --out <file.glb> [dimensions] [--texture-cap <px>] [--overwrite]

DIMENSIONS (in the chosen unit; defaults are 20 x 30 x 20 in, 0.75 in panels):
  --units <in|cm>        Unit for every length (default: in)
  --width <n>
  --height <n>
  --depth <n>
  --thickness <n>        Panel thickness
  --ceiling <n>          Ceiling height
  --material <name>      pine, oak, maple, cherry, plywood, metal, plastic
  --shelves              Add the two interior shelves
  --from <floor|ceiling> Reference plane for --offset
  --offset <n>           Distance from the reference plane
  -h, --help             Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "panels" => cmd_panels(&mut args),
            "views" => cmd_views(&mut args),
            "export" => cmd_export(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    /// Dimension flags shared by every command.
    #[derive(Default)]
    struct Dimensions {
        unit: Option<LengthUnit>,
        width: Option<f64>,
        height: Option<f64>,
        depth: Option<f64>,
        thickness: Option<f64>,
        ceiling: Option<f64>,
        material: Option<MaterialKind>,
        shelves: bool,
        reference: Option<ReferencePlane>,
        offset: Option<f64>,
    }

    impl Dimensions {
        /// Consumes `arg` if it is a dimension flag.
        fn take(&mut self, arg: &str, args: &mut Args) -> Result<bool, String> {
            match arg {
                "--units" => self.unit = Some(parse(arg, &args.value(arg)?)?),
                "--width" => self.width = Some(number(arg, &args.value(arg)?)?),
                "--height" => self.height = Some(number(arg, &args.value(arg)?)?),
                "--depth" => self.depth = Some(number(arg, &args.value(arg)?)?),
                "--thickness" => self.thickness = Some(number(arg, &args.value(arg)?)?),
                "--ceiling" => self.ceiling = Some(number(arg, &args.value(arg)?)?),
                "--material" => self.material = Some(parse(arg, &args.value(arg)?)?),
                "--shelves" => self.shelves = true,
                "--from" => self.reference = Some(parse(arg, &args.value(arg)?)?),
                "--offset" => self.offset = Some(number(arg, &args.value(arg)?)?),
                _ => return Ok(false),
            }
            Ok(true)
        }

        fn resolve(&self) -> Result<ConfiguratorState, String> {
            let unit = self.unit.unwrap_or_default();
            let mut params = DimensionParameters::default().converted(unit);
            if let Some(v) = self.width {
                params.width = v;
            }
            if let Some(v) = self.height {
                params.height = v;
            }
            if let Some(v) = self.depth {
                params.depth = v;
            }
            if let Some(v) = self.thickness {
                params.panel_thickness = v;
            }
            if let Some(v) = self.ceiling {
                params.ceiling_height = v;
            }
            if let Some(material) = self.material {
                params.material = material;
            }
            params.shelves = self.shelves;

            let placement = CabinetPlacement::new(
                self.reference.unwrap_or_default(),
                self.offset.unwrap_or(0.0),
            );
            ConfiguratorState::new(params, placement).map_err(|e| e.to_string())
        }
    }

    fn cmd_panels(args: &mut Args) -> Result<(), String> {
        let mut dims = Dimensions::default();
        while let Some(arg) = args.next() {
            if !dims.take(&arg, args)? {
                return Err(format!("unknown option `{arg}`\n\n{USAGE}"));
            }
        }
        let state = dims.resolve()?;
        let params = &state.params;
        let panels = derive_geometry(params).map_err(|e| e.to_string())?;

        let mut out = String::new();
        let _ = writeln!(
            out,
            "# {} x {} x {} {} | {} | centre at {}",
            units::format_number(params.width),
            units::format_number(params.height),
            units::format_number(params.depth),
            params.unit,
            params.material,
            params.unit.format(state.y_translation()),
        );
        let _ = writeln!(out, "{:<18} {:<10} {:>28} {:>28}", "kind", "shape", "center", "extent");
        for panel in &panels {
            let shape = match panel.shape {
                PanelShape::Box { .. } => "box",
                PanelShape::Cylinder { .. } => "cylinder",
                PanelShape::Sphere { .. } => "sphere",
            };
            let _ = writeln!(
                out,
                "{:<18} {:<10} {:>28} {:>28}",
                panel.kind.name(),
                shape,
                triple(panel.center.to_array()),
                triple(panel.extent().to_array()),
            );
        }
        print!("{out}");
        Ok(())
    }

    fn cmd_views(args: &mut Args) -> Result<(), String> {
        let mut dims = Dimensions::default();
        let mut only: Option<ViewKind> = None;
        let mut viewport = ViewportSize::new(600.0, 400.0, 1.0);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--view" => only = Some(parse("--view", &args.value("--view")?)?),
                "--size" => viewport = parse_size(&args.value("--size")?)?,
                other => {
                    if !dims.take(other, args)? {
                        return Err(format!("unknown option `{other}`\n\n{USAGE}"));
                    }
                }
            }
        }
        let state = dims.resolve()?;

        let views: Vec<ViewKind> = match only {
            Some(view) => vec![view],
            None => ViewKind::ALL.to_vec(),
        };
        for view in views {
            let drawing =
                record_view(view, &state.params, &viewport, DEFAULT_MARGIN).map_err(|e| e.to_string())?;
            println!(
                "## {} (scale {:.3}, offset {:.1},{:.1})",
                view, drawing.fit.scale, drawing.fit.offset_x, drawing.fit.offset_y
            );
            let json = serde_json::to_string_pretty(&drawing.commands).map_err(|e| e.to_string())?;
            println!("{json}");
        }
        Ok(())
    }

    fn cmd_export(args: &mut Args) -> Result<(), String> {
        let mut dims = Dimensions::default();
        let mut out: Option<PathBuf> = None;
        let mut overwrite = false;
        let mut texture_cap = EXPORT_TEXTURE_CAP;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--out" => out = Some(PathBuf::from(args.value("--out")?)),
                "--overwrite" => overwrite = true,
                "--texture-cap" => {
                    texture_cap = args
                        .value("--texture-cap")?
                        .parse()
                        .map_err(|e| format!("--texture-cap: {e}"))?;
                }
                other => {
                    if !dims.take(other, args)? {
                        return Err(format!("unknown option `{other}`\n\n{USAGE}"));
                    }
                }
            }
        }
        let out = out.ok_or("missing --out <file.glb>")?;
        let state = dims.resolve()?;

        let scene = build_export_scene(&state.params).map_err(|e| e.to_string())?;
        let bytes = GlbBackend {
            max_texture_size: texture_cap,
        }
        .export(&scene)
        .map_err(|e| e.to_string())?;
        write_binary_file(&out, &bytes, overwrite)?;

        let (json, _) = glb::read_container(&bytes)?;
        let nodes = json["nodes"].as_array().map_or(0, Vec::len);
        if let Some(bounds) = scene.bounds() {
            let size = bounds.size();
            eprintln!(
                "wrote {} ({} bytes, {nodes} nodes, {:.3} x {:.3} x {:.3} m)",
                out.display(),
                bytes.len(),
                size.x,
                size.y,
                size.z
            );
        } else {
            eprintln!("wrote {} ({} bytes)", out.display(), bytes.len());
        }
        Ok(())
    }

    fn write_binary_file(path: &Path, bytes: &[u8], overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        fs::write(path, bytes).map_err(|e| format!("write {}: {e}", path.display()))
    }

    fn triple(v: [f64; 3]) -> String {
        format!("({:.4}, {:.4}, {:.4})", v[0], v[1], v[2])
    }

    fn number(flag: &str, value: &str) -> Result<f64, String> {
        let n: f64 = value
            .parse()
            .map_err(|e| format!("{flag}: `{value}` is not a number ({e})"))?;
        if n.is_finite() {
            Ok(n)
        } else {
            Err(format!("{flag}: `{value}` is not finite"))
        }
    }

    fn parse<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, String> {
        value
            .parse()
            .map_err(|_| format!("{flag}: unknown value `{value}`"))
    }

    fn parse_size(value: &str) -> Result<ViewportSize, String> {
        let (w, h) = value
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("--size: expected <WxH>, got `{value}`"))?;
        Ok(ViewportSize::new(
            number("--size", w)?,
            number("--size", h)?,
            1.0,
        ))
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
