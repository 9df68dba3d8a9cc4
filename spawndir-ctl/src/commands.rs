use log::info;
use spawndir::capabilities::native_chdir_spawn_supported;

pub fn check_facility() {
    info!("Probing for the chdir-aware posix_spawn facility");
    println!("posix_spawn working-directory support:\n");

    if native_chdir_spawn_supported() {
        println!("[✓] addchdir file action available in this C library");
        println!("\nChildren are spawned natively; the fork/exec fallback stays idle.");
    } else {
        println!("[✗] addchdir file action NOT available");
        println!("\nDirectory changes go through the fork/exec fallback.");
    }
}
