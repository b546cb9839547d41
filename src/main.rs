fn main() {
  biometric_auditor_lib::run()
}
