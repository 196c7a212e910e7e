use std::process::Command;

fn main() {
    // Only rebuild CSS when template or CSS files change
    println!("cargo:rerun-if-changed=assets/css/input.css");
    println!("cargo:rerun-if-changed=templates/");

    // Try to run Tailwind CSS standalone CLI
    let status = Command::new("tailwindcss")
        .args([
            "-i",
            "assets/css/input.css",
            "-o",
            "assets/css/output.css",
            "--minify",
        ])
        .status();

    match status {
        Ok(s) if s.success() => {
            println!("cargo:warning=Tailwind CSS compiled successfully");
        }
        _ => {
            // Tailwind CLI not available, write a minimal fallback CSS
            println!("cargo:warning=Tailwind CLI not found, using fallback CSS");
            let fallback = r#"*, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: system-ui, -apple-system, sans-serif; line-height: 1.6; color: #1c1917; background: #fafaf9; -webkit-font-smoothing: antialiased; }
.min-h-screen { min-height: 100vh; }
.mx-auto { margin-left: auto; margin-right: auto; }
.max-w-5xl { max-width: 64rem; }
.max-w-xl { max-width: 36rem; }
.px-4 { padding-left: 1rem; padding-right: 1rem; }
.py-3 { padding-top: 0.75rem; padding-bottom: 0.75rem; }
.py-8 { padding-top: 2rem; padding-bottom: 2rem; }
.mb-2 { margin-bottom: 0.5rem; }
.mb-4 { margin-bottom: 1rem; }
.mb-8 { margin-bottom: 2rem; }
.ml-auto { margin-left: auto; }
.mt-1 { margin-top: 0.25rem; }
.flex { display: flex; }
.grow { flex-grow: 1; }
.items-center { align-items: center; }
.justify-between { justify-content: space-between; }
.gap-3 { gap: 0.75rem; }
.gap-4 { gap: 1rem; }
.text-center { text-align: center; }
.text-xs { font-size: 0.75rem; }
.text-sm { font-size: 0.875rem; }
.text-lg { font-size: 1.125rem; }
.text-xl { font-size: 1.25rem; }
.text-4xl { font-size: 2.25rem; }
.font-medium { font-weight: 500; }
.font-semibold { font-weight: 600; }
.font-bold { font-weight: 700; }
.text-stone-500 { color: #78716c; }
.text-stone-600 { color: #57534e; }
.text-stone-700 { color: #44403c; }
.text-stone-900 { color: #1c1917; }
.text-danger { color: #b91c1c; }
.bg-white { background-color: #fff; }
.bg-stone-50 { background-color: #fafaf9; }
.border-b { border-bottom: 1px solid; }
.border-stone-200 { border-color: #e7e5e4; }
.whitespace-pre-wrap { white-space: pre-wrap; }
a { color: inherit; text-decoration: none; }
a:hover { opacity: 0.8; }
ul, ol { padding-left: 1.25rem; }
.btn { display: inline-flex; align-items: center; justify-content: center; padding: 0.5rem 1rem; border-radius: 0.5rem; font-size: 0.875rem; font-weight: 500; transition: all 0.15s; cursor: pointer; text-decoration: none; }
.btn-primary { background: #1c1917; color: #fff; border: none; }
.btn-primary:hover { background: #44403c; }
.btn-secondary { background: #fff; color: #1c1917; border: 1px solid #d6d3d1; }
.btn-secondary:hover { background: #f5f5f4; }
.btn-danger { background: #fff; color: #b91c1c; border: 1px solid #fecaca; }
.btn-danger:hover { background: #fef2f2; }
.btn-link { background: none; border: none; color: #57534e; text-decoration: underline; padding: 0.5rem; }
.card { display: block; background: #fff; border-radius: 0.75rem; border: 1px solid #e7e5e4; padding: 1.5rem; box-shadow: 0 1px 2px 0 rgb(0 0 0 / 0.05); }
.input { border: 1px solid #d6d3d1; border-radius: 0.5rem; padding: 0.5rem 0.75rem; font: inherit; font-size: 0.875rem; }
.input-narrow { width: 4rem; }
.banner { display: flex; align-items: center; justify-content: space-between; gap: 1rem; padding: 0.75rem 1rem; border-radius: 0.5rem; border: 1px solid #fecaca; background: #fef2f2; color: #991b1b; font-size: 0.875rem; }
.cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(16rem, 1fr)); gap: 1rem; }
.stack { display: flex; flex-direction: column; gap: 0.75rem; }
.list { list-style: none; padding: 0; }
.list-row { display: flex; align-items: center; gap: 0.75rem; padding: 0.75rem 1rem; border-bottom: 1px solid #f5f5f4; }
.list-row:last-child { border-bottom: none; }
.tabs { display: flex; gap: 0.5rem; }
.tab { border-radius: 9999px; padding: 0.25rem 0.75rem; font-size: 0.875rem; color: #57534e; }
.tab-active { background: #1c1917; color: #fff; }
.tag { border-radius: 9999px; background: #f5f5f4; padding: 0.125rem 0.5rem; }
.thumb { width: 100%; height: 10rem; object-fit: cover; border-radius: 0.5rem; }
.check { width: 1.5rem; height: 1.5rem; border-radius: 9999px; border: 1px solid #d6d3d1; background: #fff; font-size: 0.75rem; cursor: pointer; }
.check-on { background: #1c1917; color: #fff; }
.done { text-decoration: line-through; color: #a8a29e; }
.row-pending { opacity: 0.5; }
.row-failed { border-color: #fca5a5; background: #fef2f2; }
"#;
            std::fs::create_dir_all("assets/css").ok();
            std::fs::write("assets/css/output.css", fallback).ok();
        }
    }
}
